//! The opcode catalog, instruction sequences and the canonicalization
//! relation between specialized and primitive opcodes.

mod insn;
mod iseq;
mod label;
mod local_table;

pub use insn::{
    defineclass_flags, expandarray_flags, ArithOp, CheckMatchKind, DecodeError, DefinedKind,
    Disasm, Formatter, InlineCache, Insn, Operand, PrimitiveType, SpecialObjectKind,
    SpecialVarKind, TextFormatter, ThrowTag,
};
pub use iseq::{CatchEntry, Iseq, IseqType};
pub use label::Label;
pub use local_table::LocalTable;
