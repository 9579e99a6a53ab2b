//! Named sample programs, hand-assembled the way a real compiler's output
//! would look. Stands in for source input: spec.md §1 names the
//! parser/compiler as an explicit external collaborator, so this binary
//! has nothing to read source with — only iseqs to disassemble and run.

use std::rc::Rc;

use yarv::{
    defineclass_flags, ArithOp, CallData, CallDataFlags, Insn, Iseq, IseqBuilder, IseqType,
    SpecialObjectKind, Symbol, Value,
};

pub fn names() -> &'static [&'static str] {
    &["zero", "plus", "neq", "local", "interpolate", "max", "class"]
}

pub fn build(name: &str) -> Option<Rc<Iseq>> {
    Some(match name {
        "zero" => zero(),
        "plus" => plus(),
        "neq" => neq(),
        "local" => local(),
        "interpolate" => interpolate(),
        "max" => max(),
        "class" => class(),
        _ => return None,
    })
}

fn zero() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    b.emit(Insn::PutObject { value: Value::Int(0) }).emit(Insn::Leave);
    b.finish()
}

fn plus() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let cd = CallData::new("+", 1, CallDataFlags::ARGS_SIMPLE);
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::PutObject { value: Value::Int(2) })
        .emit(Insn::OptArith { op: ArithOp::Plus, cd })
        .emit(Insn::Leave);
    b.finish()
}

fn neq() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let eq_cd = CallData::new("==", 1, CallDataFlags::ARGS_SIMPLE);
    let neq_cd = CallData::new("!=", 1, CallDataFlags::ARGS_SIMPLE);
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::PutObject { value: Value::Int(2) })
        .emit(Insn::OptNeq { eq_cd, neq_cd })
        .emit(Insn::Leave);
    b.finish()
}

fn local() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a"]);
    let idx = b.local_slot("a").expect("a declared above");
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::SetLocalWc0 { idx })
        .emit(Insn::GetLocalWc0 { idx })
        .emit(Insn::Leave);
    b.finish()
}

fn interpolate() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let to_s_cd = CallData::new("to_s", 0, CallDataFlags::ARGS_SIMPLE | CallDataFlags::FCALL);
    b.emit(Insn::PutObject { value: Value::string("") })
        .emit(Insn::PutObject { value: Value::Int(5) })
        .emit(Insn::Dup)
        .emit(Insn::ObjToString { cd: to_s_cd })
        .emit(Insn::AnyToString)
        .emit(Insn::ConcatStrings { n: 1 })
        .emit(Insn::Leave);
    b.finish()
}

fn max() -> Rc<Iseq> {
    let mut b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a", "b", "c"]);
    let a = b.local_slot("a").expect("a declared above");
    let bb = b.local_slot("b").expect("b declared above");
    let c = b.local_slot("c").expect("c declared above");
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::SetLocalWc0 { idx: a })
        .emit(Insn::PutObject { value: Value::Int(2) })
        .emit(Insn::SetLocalWc0 { idx: bb })
        .emit(Insn::PutObject { value: Value::Int(3) })
        .emit(Insn::SetLocalWc0 { idx: c })
        .emit(Insn::GetLocalWc0 { idx: a })
        .emit(Insn::GetLocalWc0 { idx: bb })
        .emit(Insn::GetLocalWc0 { idx: c })
        .emit(Insn::OptNewArrayMax { n: 3 })
        .emit(Insn::Leave);
    b.finish()
}

fn class() -> Rc<Iseq> {
    let mut body = IseqBuilder::new("Greeter", IseqType::Class);
    body.emit(Insn::PutNil).emit(Insn::Leave);
    let class_iseq = body.finish();

    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    b.emit(Insn::PutSpecialObject { kind: SpecialObjectKind::ConstBase })
        .emit(Insn::PutNil)
        .emit(Insn::DefineClass {
            name: Symbol::intern("Greeter"),
            class_iseq,
            flags: defineclass_flags::TYPE_CLASS,
        })
        .emit(Insn::Leave);
    b.finish()
}
