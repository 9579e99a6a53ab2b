//! Cross-module scenarios spanning canonicalization, the `to_a`/`from_array`
//! codec, and `Iseq` together — the way a disassembler or an external
//! compiler would actually touch this crate, rather than one opcode at a
//! time in isolation.

use yarv_bytecode::{Insn, Iseq, IseqType, LocalTable, Operand};
use yarv_calldata::{CallData, CallDataFlags};
use yarv_primitives::{Symbol, Value};

fn roundtrip(insn: &Insn) -> Insn {
    let a = insn.to_a();
    let tag = match &a[0] {
        Operand::Str(s) => s.to_string(),
        _ => panic!("first operand must be the tag"),
    };
    Insn::from_array(&tag, &a[1..]).expect("decode")
}

#[test]
fn a_specialized_opcode_and_its_canonical_form_serialize_to_different_tags() {
    let cd = CallData::new("+", 1, CallDataFlags::OPT_SEND);
    let specialized = Insn::OptArith { op: yarv_bytecode::ArithOp::Plus, cd: cd.clone() };
    let canonical = specialized.canonical();

    assert!(specialized.is_specialized());
    assert!(matches!(canonical, Insn::Send { .. }));
    assert_ne!(specialized.tag(), canonical.tag());
}

#[test]
fn canonicalization_round_trips_through_to_a_from_array() {
    let insn = Insn::PutNil;
    let canonical = insn.canonical();
    let decoded = roundtrip(&canonical);
    assert_eq!(format!("{decoded:?}"), format!("{canonical:?}"));
}

#[test]
fn an_iseq_built_from_a_mix_of_specialized_and_primitive_opcodes_preserves_order() {
    let locals = LocalTable::default();
    let mut iseq = Iseq::new("<main>", IseqType::Main, locals);
    iseq.insns = vec![
        Insn::PutObjectInt2Fix1,
        Insn::PutObject { value: Value::Int(2) },
        Insn::OptArith {
            op: yarv_bytecode::ArithOp::Plus,
            cd: CallData::new("+", 1, CallDataFlags::OPT_SEND),
        },
        Insn::Leave,
    ];

    assert!(iseq.encoded_length() as usize >= iseq.insns.len());
    assert!(iseq.insns[0].is_specialized());
    assert!(matches!(iseq.insns[0].canonical(), Insn::PutObject { value: Value::Int(1) }));
}

#[test]
fn resolve_local_finds_a_declared_name_and_misses_an_undeclared_one() {
    let mut locals = LocalTable::default();
    locals.push(Symbol::intern("count"));
    let iseq = Iseq::new("<main>", IseqType::Main, locals);

    assert!(iseq.resolve_local(&Symbol::intern("count")).is_some());
    assert!(iseq.resolve_local(&Symbol::intern("missing")).is_none());
}
