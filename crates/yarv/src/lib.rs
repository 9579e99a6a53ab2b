//! High-level facade over the yarv bytecode VM: an [`IseqBuilder`]
//! assembler standing in for the external compiler spec.md §1 excludes,
//! a text [`disassemble`]r, and a thin [`eval`] entry point over
//! [`yarv_interpreter::Vm`].

mod builder;
mod disasm;

pub use builder::IseqBuilder;
pub use disasm::disassemble;

pub use yarv_bytecode::{
    defineclass_flags, expandarray_flags, ArithOp, CatchEntry, CheckMatchKind, DefinedKind, Insn,
    Iseq, IseqType, Label, LocalTable, PrimitiveType, SpecialObjectKind, SpecialVarKind, ThrowTag,
};
pub use yarv_calldata::{CallData, CallDataFlags};
pub use yarv_interpreter::{Vm, VmConfig, VmError};
pub use yarv_primitives::{RangeValue, Symbol, Value};

use std::rc::Rc;

/// Runs `iseq` as a top-level program against a fresh [`Vm`] and returns
/// the value its final `leave` produces.
pub fn eval(iseq: Rc<Iseq>) -> Result<Value, VmError> {
    let vm = Vm::new();
    vm.run_method(iseq, Value::Nil, None)
}

/// Errors raised while hand-assembling an [`Iseq`] through [`IseqBuilder`],
/// as opposed to [`VmError`], which covers failures while running one.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("local {0:?} was never declared with with_locals")]
    UndeclaredLocal(String),
}
