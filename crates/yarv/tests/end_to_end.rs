//! The six end-to-end scenarios from spec.md §8, hand-assembled through
//! `IseqBuilder` rather than a parser (spec.md §1 names the compiler as an
//! external collaborator), exercised the way the teacher exercises
//! cross-module behavior from outside the crate (mirrors
//! `crates/interpreter/tests/eof.rs`'s placement).

use yarv::{
    disassemble, eval, defineclass_flags, ArithOp, CallData, CallDataFlags, Insn, IseqBuilder,
    IseqType, SpecialObjectKind, Symbol, Value,
};

#[test]
fn bare_literal_program_yields_its_value() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    b.emit(Insn::PutObject { value: Value::Int(0) }).emit(Insn::Leave);
    assert_eq!(eval(b.finish()).unwrap(), Value::Int(0));
}

#[test]
fn opt_plus_canonicalizes_to_a_plus_send() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let cd = CallData::new("+", 1, CallDataFlags::ARGS_SIMPLE);
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::PutObject { value: Value::Int(2) })
        .emit(Insn::OptArith { op: ArithOp::Plus, cd })
        .emit(Insn::Leave);
    assert_eq!(eval(b.finish()).unwrap(), Value::Int(3));
}

#[test]
fn opt_neq_yields_a_boolean() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let eq_cd = CallData::new("==", 1, CallDataFlags::ARGS_SIMPLE);
    let neq_cd = CallData::new("!=", 1, CallDataFlags::ARGS_SIMPLE);
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::PutObject { value: Value::Int(2) })
        .emit(Insn::OptNeq { eq_cd, neq_cd })
        .emit(Insn::Leave);
    assert_eq!(eval(b.finish()).unwrap(), Value::Bool(true));
}

#[test]
fn local_assignment_then_read_round_trips() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a"]);
    let idx = b.local_slot("a").unwrap();
    b.emit(Insn::PutObject { value: Value::Int(1) })
        .emit(Insn::SetLocalWc0 { idx })
        .emit(Insn::GetLocalWc0 { idx })
        .emit(Insn::Leave);
    assert_eq!(eval(b.finish()).unwrap(), Value::Int(1));
}

#[test]
fn string_interpolation_sequence_yields_the_interpolated_string() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    let to_s_cd = CallData::new("to_s", 0, CallDataFlags::ARGS_SIMPLE | CallDataFlags::FCALL);
    b.emit(Insn::PutObject { value: Value::string("") })
        .emit(Insn::PutObject { value: Value::Int(5) })
        .emit(Insn::Dup)
        .emit(Insn::ObjToString { cd: to_s_cd })
        .emit(Insn::AnyToString)
        .emit(Insn::ConcatStrings { n: 1 })
        .emit(Insn::Leave);
    assert_eq!(eval(b.finish()).unwrap(), Value::string("5"));
}

#[test]
fn array_max_over_locals_yields_the_largest_element() {
    let mut b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a", "b", "c"]);
    let a = b.local_slot("a").unwrap();
    let bb = b.local_slot("b").unwrap();
    let c = b.local_slot("c").unwrap();
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
    assert_eq!(eval(b.finish()).unwrap(), Value::Int(3));
}

#[test]
fn disassembly_renders_one_line_per_instruction_plus_nested_iseqs() {
    let mut class_body = IseqBuilder::new("Greeter", IseqType::Class);
    class_body.emit(Insn::PutNil).emit(Insn::Leave);
    let class_iseq = class_body.finish();

    let mut b = IseqBuilder::new("<main>", IseqType::Main);
    b.emit(Insn::PutSpecialObject { kind: SpecialObjectKind::ConstBase })
        .emit(Insn::PutNil)
        .emit(Insn::DefineClass {
            name: Symbol::intern("Greeter"),
            class_iseq,
            flags: defineclass_flags::TYPE_CLASS,
        })
        .emit(Insn::Leave);
    let text = disassemble(&b.finish());
    assert!(text.contains("putspecialobject"));
    assert!(text.contains("defineclass"));
    assert!(text.contains("== disasm: #<ISeq:Greeter@class>"));
}
