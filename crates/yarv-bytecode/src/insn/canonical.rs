//! Canonicalization: the partial map from specialized/legacy opcodes onto
//! primitive opcodes with identical observable effect (spec.md §4.11).
//!
//! The relation is idempotent and converges in one step by construction:
//! every rewrite target below is already a fixed point of this function.

use yarv_primitives::Value;

use super::tags::InlineCache;
use super::Insn;

impl Insn {
    /// Returns the primitive opcode this instruction is equivalent to, or
    /// a clone of `self` if it already is primitive.
    pub fn canonical(&self) -> Insn {
        match self {
            Insn::PutNil => Insn::PutObject { value: Value::Nil },
            Insn::PutObjectInt2Fix0 => Insn::PutObject { value: Value::Int(0) },
            Insn::PutObjectInt2Fix1 => Insn::PutObject { value: Value::Int(1) },

            Insn::OptArith { op: _, cd } => Insn::Send {
                cd: cd.clone(),
                block_iseq: None,
            },
            Insn::OptSendWithoutBlock { cd } => Insn::Send {
                cd: cd.clone(),
                block_iseq: None,
            },

            Insn::GetLocalWc0 { idx } => Insn::GetLocal { idx: *idx, level: 0 },
            Insn::GetLocalWc1 { idx } => Insn::GetLocal { idx: *idx, level: 1 },
            Insn::SetLocalWc0 { idx } => Insn::SetLocal { idx: *idx, level: 0 },
            Insn::SetLocalWc1 { idx } => Insn::SetLocal { idx: *idx, level: 1 },

            Insn::GetClassVariableLegacy { name } => Insn::GetClassVariable {
                name: name.clone(),
                cache: InlineCache::new(),
            },
            Insn::SetClassVariableLegacy { name } => Insn::SetClassVariable {
                name: name.clone(),
                cache: InlineCache::new(),
            },

            other => other.clone(),
        }
    }

    /// Whether this instruction has a canonical form distinct from itself.
    pub fn is_specialized(&self) -> bool {
        std::mem::discriminant(&self.canonical()) != std::mem::discriminant(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yarv_calldata::{CallData, CallDataFlags};

    #[test]
    fn putnil_canonicalizes_to_putobject_nil() {
        assert!(matches!(
            Insn::PutNil.canonical(),
            Insn::PutObject { value: Value::Nil }
        ));
    }

    #[test]
    fn opt_plus_canonicalizes_to_send() {
        let cd = CallData::new("+", 1, CallDataFlags::OPT_SEND);
        let insn = Insn::OptArith {
            op: crate::ArithOp::Plus,
            cd: cd.clone(),
        };
        let canon = insn.canonical();
        match canon {
            Insn::Send { cd: got, block_iseq: None } => assert_eq!(got, cd),
            _ => panic!("expected Send"),
        }
    }

    #[test]
    fn canonicalization_is_idempotent_in_one_step() {
        for insn in sample_insns() {
            let once = insn.canonical();
            let twice = once.canonical();
            assert_eq!(
                format!("{once:?}"),
                format!("{twice:?}"),
                "canonical() is not idempotent for {insn:?}"
            );
        }
    }

    fn sample_insns() -> Vec<Insn> {
        vec![
            Insn::Pop,
            Insn::PutNil,
            Insn::PutObjectInt2Fix0,
            Insn::PutObjectInt2Fix1,
            Insn::GetLocalWc0 { idx: 0 },
            Insn::GetLocalWc1 { idx: 1 },
            Insn::SetLocalWc0 { idx: 0 },
            Insn::SetLocalWc1 { idx: 1 },
            Insn::OptArith {
                op: crate::ArithOp::Plus,
                cd: CallData::new("+", 1, CallDataFlags::OPT_SEND),
            },
            Insn::OptSendWithoutBlock {
                cd: CallData::new("to_s", 0, CallDataFlags::FCALL),
            },
            Insn::GetClassVariableLegacy {
                name: yarv_primitives::Symbol::intern("@@x"),
            },
        ]
    }
}
