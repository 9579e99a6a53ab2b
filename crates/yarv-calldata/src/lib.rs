//! `CallData`: the immutable call-site descriptor passed to every call-like
//! opcode (`send`, `invokesuper`, `invokeblock`, and the `opt_*` fast-path
//! specializations that canonicalize to `send`).

use bitflags::bitflags;
use yarv_primitives::Symbol;

bitflags! {
    /// Call-site flag bits, bit position and meaning exactly as specified.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallDataFlags: u16 {
        const ARGS_SPLAT   = 1 << 0;
        const BLOCKARG     = 1 << 1;
        const FCALL        = 1 << 2;
        const VCALL        = 1 << 3;
        const ARGS_SIMPLE  = 1 << 4;
        const BLOCKISEQ    = 1 << 5;
        const KWARG        = 1 << 6;
        const KW_SPLAT     = 1 << 7;
        const TAILCALL     = 1 << 8;
        const SUPER        = 1 << 9;
        const ZSUPER       = 1 << 10;
        const OPT_SEND     = 1 << 11;
        const KW_SPLAT_MUT = 1 << 12;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CallDataFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CallDataFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u16::deserialize(deserializer)?;
        Ok(CallDataFlags::from_bits_truncate(bits))
    }
}

/// An immutable call-site descriptor. Created by the compiler (or a
/// deserializer); never mutated once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallData {
    pub method: Symbol,
    pub argc: u16,
    pub flags: CallDataFlags,
    pub kw_arg: Option<Vec<Symbol>>,
}

impl CallData {
    pub fn new(method: impl Into<Symbol>, argc: u16, flags: CallDataFlags) -> Self {
        CallData {
            method: method.into(),
            argc,
            flags,
            kw_arg: None,
        }
    }

    pub fn with_kw_arg(mut self, names: Vec<Symbol>) -> Self {
        self.flags |= CallDataFlags::KWARG;
        self.kw_arg = Some(names);
        self
    }

    pub fn has_block_arg(&self) -> bool {
        self.flags.intersects(CallDataFlags::BLOCKARG | CallDataFlags::BLOCKISEQ)
    }

    pub fn is_super(&self) -> bool {
        self.flags.intersects(CallDataFlags::SUPER | CallDataFlags::ZSUPER)
    }

    /// Number of keyword values the caller pushes, matching `kw_arg`'s
    /// length (0 if no keyword arguments were supplied at this site).
    pub fn kw_count(&self) -> u16 {
        self.kw_arg.as_ref().map_or(0, |names| names.len() as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_kw_arg_sets_the_kwarg_flag() {
        let cd = CallData::new("foo", 1, CallDataFlags::FCALL)
            .with_kw_arg(vec![Symbol::intern("x")]);
        assert!(cd.flags.contains(CallDataFlags::KWARG));
        assert_eq!(cd.kw_count(), 1);
    }

    #[test]
    fn super_flags_are_recognized() {
        let cd = CallData::new("foo", 0, CallDataFlags::ZSUPER);
        assert!(cd.is_super());
    }
}
