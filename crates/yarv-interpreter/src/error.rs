use yarv_bytecode::ThrowTag;

/// Errors observable at the opcode layer (top-level spec's error-handling
/// design): name lookup failures, calls to a method the receiver doesn't
/// have, opcodes whose semantics are host-language errors, and unmatched
/// non-local control transfer.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("{kind} {name:?} not found")]
    NameNotFound { kind: &'static str, name: String },

    #[error("undefined method {method:?} for {receiver_class}")]
    MethodMissing {
        receiver_class: &'static str,
        method: String,
    },

    #[error("type error: {0}")]
    TypeError(String),

    #[error("argument error: {0}")]
    ArgumentError(String),

    #[error("divided by 0")]
    DivisionByZero,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("opcode {0} has no completed reference-engine semantics for this input")]
    Unimplemented(&'static str),

    /// Internal control-flow signal: a `throw` that hasn't yet found a
    /// matching catch-table entry. Not a user-facing error by itself —
    /// [`crate::vm::Vm::run_frame`] intercepts it at each frame boundary
    /// and only lets it escape the outermost frame as a real error.
    #[error("unhandled {tag:?}")]
    Unwind { tag: ThrowTag, value: yarv_primitives::Value },
}

impl VmError {
    pub fn is_unwind(&self) -> bool {
        matches!(self, VmError::Unwind { .. })
    }
}
