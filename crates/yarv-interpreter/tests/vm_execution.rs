//! Cross-module scenarios driving `Vm`/`Frame` end to end over hand-built
//! `Iseq`s, the way `yarv-bytecode`'s opcode catalog is actually consumed
//! at runtime rather than just shaped/serialized.

use std::rc::Rc;

use yarv_bytecode::{Insn, Iseq, IseqType, LocalTable};
use yarv_calldata::{CallData, CallDataFlags};
use yarv_interpreter::{BlockObject, Frame, Vm, VmError};
use yarv_primitives::Value;

fn iseq(insns: Vec<Insn>) -> Rc<Iseq> {
    let mut iseq = Iseq::new("<main>", IseqType::Main, LocalTable::default());
    iseq.insns = insns;
    Rc::new(iseq)
}

#[test]
fn opt_plus_over_two_literals_runs_through_invoke() {
    let program = iseq(vec![
        Insn::PutObject { value: Value::Int(1) },
        Insn::PutObject { value: Value::Int(2) },
        Insn::OptArith { op: yarv_bytecode::ArithOp::Plus, cd: CallData::new("+", 1, CallDataFlags::ARGS_SIMPLE) },
        Insn::Leave,
    ]);
    let vm = Vm::new();
    assert_eq!(vm.run_method(program, Value::Nil, None).unwrap(), Value::Int(3));
}

#[test]
fn popping_past_the_stack_reports_underflow_instead_of_nil() {
    let program = iseq(vec![Insn::Pop, Insn::Leave]);
    let vm = Vm::new();
    let err = vm.run_method(program, Value::Nil, None).unwrap_err();
    assert!(matches!(err, VmError::StackUnderflow));
}

#[test]
fn a_block_param_proxy_resolves_lazily_against_its_captured_frame() {
    let block_body = iseq(vec![Insn::PutObject { value: Value::Int(42) }, Insn::Leave]);
    let caller_iseq = Iseq::new("<main>", IseqType::Main, LocalTable::default());
    let caller_frame = Frame::new(Rc::new(caller_iseq), Value::Nil, None, None);
    let block = Rc::new(BlockObject { iseq: block_body, captured_frame: caller_frame });

    let program = iseq(vec![Insn::GetBlockParamProxy { idx: 0, level: 0 }, Insn::Leave]);
    let frame = Frame::new(program, Value::Nil, None, None);
    frame.block_set(0, Some(block));

    let vm = Vm::new();
    let result = vm.run_frame(frame.clone()).unwrap();
    let proxy = yarv_interpreter::as_block_param_proxy(&result).expect("pushed a proxy");
    assert_eq!(proxy.resolve().unwrap().captured_frame.self_val, Value::Nil);
}
