//! Opcode execution and runtime state for the yarv bytecode VM: frames,
//! globals, the object universe backing `Value::Foreign`, and the
//! fetch-execute loop that drives an [`Iseq`](yarv_bytecode::Iseq).
//!
//! `yarv-bytecode` describes *what an opcode is*; this crate describes
//! *what running one does*.

mod builtin;
mod error;
pub mod exec;
mod frame;
mod globals;
mod objects;
mod vm;

pub use error::VmError;
pub use exec::{ControlFlow, Execute};
pub use frame::{Frame, SpecialVars};
pub use globals::GlobalTable;
pub use objects::{
    as_block, as_block_param_proxy, as_class, as_instance, as_method, class_value, resolve_block,
    BlockObject, BlockParamProxy, ClassObject, InstanceObject, MethodObject,
};
pub use vm::{Vm, VmConfig};
