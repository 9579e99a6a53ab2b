//! `to_a`/`from_array` round-trip serialization (spec.md §6, testable
//! property 4): every instruction serializes to a tuple whose first
//! element is its lowercase symbol tag, and decoding that tuple produces
//! an equal instruction.

use std::rc::Rc;

use thiserror::Error;

use yarv_calldata::CallData;
use yarv_primitives::{Symbol, Value};

use crate::iseq::Iseq;
use crate::label::Label;

use super::tags::{
    ArithOp, CheckMatchKind, DefinedKind, InlineCache, PrimitiveType, SpecialObjectKind,
    SpecialVarKind, ThrowTag,
};
use super::Insn;

/// One serialized operand slot.
#[derive(Debug, Clone)]
pub enum Operand {
    UInt(u32),
    Bool(bool),
    Value(Value),
    Str(Rc<str>),
    Symbol(Symbol),
    Label(Label),
    CallData(CallData),
    Iseq(Rc<Iseq>),
    OptIseq(Option<Rc<Iseq>>),
    Symbols(Rc<Vec<Symbol>>),
    Values(Rc<Vec<Value>>),
    Pairs(Rc<Vec<(Value, Value)>>),
    CaseTable(Rc<Vec<(Value, Label)>>),
    Cache(InlineCache),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown instruction tag {0:?}")]
    UnknownTag(String),
    #[error("{tag}: expected {expected} operands, got {got}")]
    WrongArity {
        tag: String,
        expected: usize,
        got: usize,
    },
    #[error("{tag}: operand {index} has the wrong type")]
    TypeMismatch { tag: String, index: usize },
    #[error("{tag}: operand {index} has an invalid value")]
    InvalidValue { tag: String, index: usize },
}

impl Insn {
    /// Serializes this instruction as `(tag, operand...)`.
    pub fn to_a(&self) -> Vec<Operand> {
        use Insn::*;
        let mut out = vec![Operand::Str(Rc::from(self.tag()))];
        match self {
            Pop | Dup | Swap | PutNil | PutSelf | PutObjectInt2Fix0 | PutObjectInt2Fix1
            | AnyToString | Intern | ConcatArray | Leave | Nop => {}

            DupN { n } | TopN { n } | SetN { n } | AdjustStack { n } => {
                out.push(Operand::UInt(*n));
            }
            PutObject { value } => out.push(Operand::Value(value.clone())),
            PutString { value } => out.push(Operand::Str(value.clone())),
            DupArray { value } => out.push(Operand::Values(value.clone())),
            DupHash { value } => out.push(Operand::Pairs(value.clone())),
            PutSpecialObject { kind } => out.push(Operand::UInt(*kind as u32)),

            OptArith { cd, .. } => out.push(Operand::CallData(cd.clone())),
            OptNeq { eq_cd, neq_cd } => {
                out.push(Operand::CallData(eq_cd.clone()));
                out.push(Operand::CallData(neq_cd.clone()));
            }
            OptNewArrayMax { n } | OptNewArrayMin { n } => out.push(Operand::UInt(*n)),
            OptArefWith { key, cd } | OptAsetWith { key, cd } => {
                out.push(Operand::Str(key.clone()));
                out.push(Operand::CallData(cd.clone()));
            }
            OptStrFreeze { value, cd } | OptStrUminus { value, cd } => {
                out.push(Operand::Str(value.clone()));
                out.push(Operand::CallData(cd.clone()));
            }

            ConcatStrings { n } => out.push(Operand::UInt(*n)),
            ObjToString { cd } => out.push(Operand::CallData(cd.clone())),
            ToRegexp { opts, n } => {
                out.push(Operand::UInt(*opts));
                out.push(Operand::UInt(*n));
            }
            NewRange { exclusive } => out.push(Operand::Bool(*exclusive)),

            NewArray { n } | NewArrayKwSplat { n } | NewHash { n } => out.push(Operand::UInt(*n)),
            SplatArray { flag } => out.push(Operand::Bool(*flag)),
            ExpandArray { n, flags } => {
                out.push(Operand::UInt(*n));
                out.push(Operand::UInt(*flags));
            }

            GetLocal { idx, level } | SetLocal { idx, level } => {
                out.push(Operand::UInt(*idx));
                out.push(Operand::UInt(*level));
            }
            GetLocalWc0 { idx } | GetLocalWc1 { idx } | SetLocalWc0 { idx } | SetLocalWc1 { idx } => {
                out.push(Operand::UInt(*idx));
            }
            GetBlockParam { idx, level }
            | GetBlockParamProxy { idx, level }
            | SetBlockParam { idx, level } => {
                out.push(Operand::UInt(*idx));
                out.push(Operand::UInt(*level));
            }
            GetInstanceVariable { name, cache } | SetInstanceVariable { name, cache } => {
                out.push(Operand::Symbol(name.clone()));
                out.push(Operand::Cache(cache.clone()));
            }
            GetClassVariable { name, cache } | SetClassVariable { name, cache } => {
                out.push(Operand::Symbol(name.clone()));
                out.push(Operand::Cache(cache.clone()));
            }
            GetClassVariableLegacy { name } | SetClassVariableLegacy { name } => {
                out.push(Operand::Symbol(name.clone()));
            }
            GetGlobal { name } | SetGlobal { name } | GetConstant { name } | SetConstant { name } => {
                out.push(Operand::Symbol(name.clone()));
            }
            OptGetConstantPath { names } => out.push(Operand::Symbols(names.clone())),
            GetSpecial { key, kind } => {
                out.push(Operand::UInt(*key));
                out.push(Operand::UInt(*kind as u32));
            }
            SetSpecial { key } => out.push(Operand::UInt(*key)),

            Jump { label } | BranchIf { label } | BranchUnless { label } | BranchNil { label } => {
                out.push(Operand::Label(label.clone()));
            }
            OptCaseDispatch { table, else_label } => {
                out.push(Operand::CaseTable(table.clone()));
                out.push(Operand::Label(else_label.clone()));
            }
            Throw { tag } => out.push(Operand::UInt(*tag as u32)),

            CheckMatch { kind } => out.push(Operand::UInt(*kind as u32)),
            CheckType { kind } => out.push(Operand::UInt(kind.code() as u32)),
            CheckKeyword { bits_idx, kw_idx } => {
                out.push(Operand::UInt(*bits_idx));
                out.push(Operand::UInt(*kw_idx));
            }
            Defined { kind, name, message } => {
                out.push(Operand::Str(Rc::from(kind.as_str())));
                out.push(Operand::Str(name.clone()));
                out.push(Operand::Value(message.clone()));
            }

            Send { cd, block_iseq } => {
                out.push(Operand::CallData(cd.clone()));
                out.push(Operand::OptIseq(block_iseq.clone()));
            }
            OptSendWithoutBlock { cd } => out.push(Operand::CallData(cd.clone())),
            InvokeBlock { cd } => out.push(Operand::CallData(cd.clone())),
            InvokeSuper { cd, block_iseq } => {
                out.push(Operand::CallData(cd.clone()));
                out.push(Operand::OptIseq(block_iseq.clone()));
            }
            DefineClass { name, class_iseq, flags } => {
                out.push(Operand::Symbol(name.clone()));
                out.push(Operand::Iseq(class_iseq.clone()));
                out.push(Operand::UInt(*flags));
            }
            DefineMethod { name, iseq } | DefineSMethod { name, iseq } => {
                out.push(Operand::Symbol(name.clone()));
                out.push(Operand::Iseq(iseq.clone()));
            }
            Once { iseq, .. } => out.push(Operand::Iseq(iseq.clone())),
        }
        out
    }

    /// Reconstructs an instruction from its tag and operand slots.
    pub fn from_array(tag: &str, ops: &[Operand]) -> Result<Insn, DecodeError> {
        arity_dispatch(tag, ops)
    }
}

fn err_arity(tag: &str, expected: usize, got: usize) -> DecodeError {
    DecodeError::WrongArity { tag: tag.to_string(), expected, got }
}

fn uint(ops: &[Operand], i: usize, tag: &str) -> Result<u32, DecodeError> {
    match ops.get(i) {
        Some(Operand::UInt(v)) => Ok(*v),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn boolean(ops: &[Operand], i: usize, tag: &str) -> Result<bool, DecodeError> {
    match ops.get(i) {
        Some(Operand::Bool(v)) => Ok(*v),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn value(ops: &[Operand], i: usize, tag: &str) -> Result<Value, DecodeError> {
    match ops.get(i) {
        Some(Operand::Value(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn rcstr(ops: &[Operand], i: usize, tag: &str) -> Result<Rc<str>, DecodeError> {
    match ops.get(i) {
        Some(Operand::Str(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn symbol(ops: &[Operand], i: usize, tag: &str) -> Result<Symbol, DecodeError> {
    match ops.get(i) {
        Some(Operand::Symbol(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn label(ops: &[Operand], i: usize, tag: &str) -> Result<Label, DecodeError> {
    match ops.get(i) {
        Some(Operand::Label(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn calldata(ops: &[Operand], i: usize, tag: &str) -> Result<CallData, DecodeError> {
    match ops.get(i) {
        Some(Operand::CallData(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn opt_iseq(ops: &[Operand], i: usize, tag: &str) -> Result<Option<Rc<Iseq>>, DecodeError> {
    match ops.get(i) {
        Some(Operand::OptIseq(v)) => Ok(v.clone()),
        Some(Operand::Iseq(v)) => Ok(Some(v.clone())),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn iseq(ops: &[Operand], i: usize, tag: &str) -> Result<Rc<Iseq>, DecodeError> {
    match ops.get(i) {
        Some(Operand::Iseq(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn symbols(ops: &[Operand], i: usize, tag: &str) -> Result<Rc<Vec<Symbol>>, DecodeError> {
    match ops.get(i) {
        Some(Operand::Symbols(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn values(ops: &[Operand], i: usize, tag: &str) -> Result<Rc<Vec<Value>>, DecodeError> {
    match ops.get(i) {
        Some(Operand::Values(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn pairs(ops: &[Operand], i: usize, tag: &str) -> Result<Rc<Vec<(Value, Value)>>, DecodeError> {
    match ops.get(i) {
        Some(Operand::Pairs(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn case_table(
    ops: &[Operand],
    i: usize,
    tag: &str,
) -> Result<Rc<Vec<(Value, Label)>>, DecodeError> {
    match ops.get(i) {
        Some(Operand::CaseTable(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn cache(ops: &[Operand], i: usize, tag: &str) -> Result<InlineCache, DecodeError> {
    match ops.get(i) {
        Some(Operand::Cache(v)) => Ok(v.clone()),
        _ => Err(DecodeError::TypeMismatch { tag: tag.to_string(), index: i }),
    }
}

fn require(ops: &[Operand], n: usize, tag: &str) -> Result<(), DecodeError> {
    if ops.len() == n {
        Ok(())
    } else {
        Err(err_arity(tag, n, ops.len()))
    }
}

fn arity_dispatch(raw_tag: &str, ops: &[Operand]) -> Result<Insn, DecodeError> {
    if let Some(op) = ArithOp::from_tag(raw_tag) {
        require(ops, 1, "opt_arith")?;
        return Ok(Insn::OptArith { op, cd: calldata(ops, 0, "opt_arith")? });
    }

    macro_rules! t {
        () => {
            raw_tag
        };
    }

    match raw_tag {
        "pop" => { require(ops, 0, t!())?; Ok(Insn::Pop) }
        "dup" => { require(ops, 0, t!())?; Ok(Insn::Dup) }
        "dupn" => { require(ops, 1, t!())?; Ok(Insn::DupN { n: uint(ops, 0, t!())? }) }
        "swap" => { require(ops, 0, t!())?; Ok(Insn::Swap) }
        "topn" => { require(ops, 1, t!())?; Ok(Insn::TopN { n: uint(ops, 0, t!())? }) }
        "setn" => { require(ops, 1, t!())?; Ok(Insn::SetN { n: uint(ops, 0, t!())? }) }
        "adjuststack" => { require(ops, 1, t!())?; Ok(Insn::AdjustStack { n: uint(ops, 0, t!())? }) }

        "putnil" => { require(ops, 0, t!())?; Ok(Insn::PutNil) }
        "putself" => { require(ops, 0, t!())?; Ok(Insn::PutSelf) }
        "putobject" => { require(ops, 1, t!())?; Ok(Insn::PutObject { value: value(ops, 0, t!())? }) }
        "putobject_INT2FIX_0_" => { require(ops, 0, t!())?; Ok(Insn::PutObjectInt2Fix0) }
        "putobject_INT2FIX_1_" => { require(ops, 0, t!())?; Ok(Insn::PutObjectInt2Fix1) }
        "putstring" => { require(ops, 1, t!())?; Ok(Insn::PutString { value: rcstr(ops, 0, t!())? }) }
        "duparray" => { require(ops, 1, t!())?; Ok(Insn::DupArray { value: values(ops, 0, t!())? }) }
        "duphash" => { require(ops, 1, t!())?; Ok(Insn::DupHash { value: pairs(ops, 0, t!())? }) }
        "putspecialobject" => {
            require(ops, 1, t!())?;
            let tag = t!();
            let kind = SpecialObjectKind::from_u8(uint(ops, 0, tag)? as u8)
                .ok_or(DecodeError::InvalidValue { tag: tag.to_string(), index: 0 })?;
            Ok(Insn::PutSpecialObject { kind })
        }

        "opt_neq" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptNeq { eq_cd: calldata(ops, 0, t!())?, neq_cd: calldata(ops, 1, t!())? })
        }
        "opt_newarray_max" => { require(ops, 1, t!())?; Ok(Insn::OptNewArrayMax { n: uint(ops, 0, t!())? }) }
        "opt_newarray_min" => { require(ops, 1, t!())?; Ok(Insn::OptNewArrayMin { n: uint(ops, 0, t!())? }) }
        "opt_aref_with" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptArefWith { key: rcstr(ops, 0, t!())?, cd: calldata(ops, 1, t!())? })
        }
        "opt_aset_with" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptAsetWith { key: rcstr(ops, 0, t!())?, cd: calldata(ops, 1, t!())? })
        }
        "opt_str_freeze" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptStrFreeze { value: rcstr(ops, 0, t!())?, cd: calldata(ops, 1, t!())? })
        }
        "opt_str_uminus" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptStrUminus { value: rcstr(ops, 0, t!())?, cd: calldata(ops, 1, t!())? })
        }

        "concatstrings" => { require(ops, 1, t!())?; Ok(Insn::ConcatStrings { n: uint(ops, 0, t!())? }) }
        "anytostring" => { require(ops, 0, t!())?; Ok(Insn::AnyToString) }
        "objtostring" => { require(ops, 1, t!())?; Ok(Insn::ObjToString { cd: calldata(ops, 0, t!())? }) }
        "intern" => { require(ops, 0, t!())?; Ok(Insn::Intern) }
        "toregexp" => {
            require(ops, 2, t!())?;
            Ok(Insn::ToRegexp { opts: uint(ops, 0, t!())?, n: uint(ops, 1, t!())? })
        }
        "newrange" => { require(ops, 1, t!())?; Ok(Insn::NewRange { exclusive: boolean(ops, 0, t!())? }) }

        "newarray" => { require(ops, 1, t!())?; Ok(Insn::NewArray { n: uint(ops, 0, t!())? }) }
        "newarraykwsplat" => { require(ops, 1, t!())?; Ok(Insn::NewArrayKwSplat { n: uint(ops, 0, t!())? }) }
        "newhash" => { require(ops, 1, t!())?; Ok(Insn::NewHash { n: uint(ops, 0, t!())? }) }
        "concatarray" => { require(ops, 0, t!())?; Ok(Insn::ConcatArray) }
        "splatarray" => { require(ops, 1, t!())?; Ok(Insn::SplatArray { flag: boolean(ops, 0, t!())? }) }
        "expandarray" => {
            require(ops, 2, t!())?;
            Ok(Insn::ExpandArray { n: uint(ops, 0, t!())?, flags: uint(ops, 1, t!())? })
        }

        "getlocal" => {
            require(ops, 2, t!())?;
            Ok(Insn::GetLocal { idx: uint(ops, 0, t!())?, level: uint(ops, 1, t!())? })
        }
        "setlocal" => {
            require(ops, 2, t!())?;
            Ok(Insn::SetLocal { idx: uint(ops, 0, t!())?, level: uint(ops, 1, t!())? })
        }
        "getlocal_WC_0" => { require(ops, 1, t!())?; Ok(Insn::GetLocalWc0 { idx: uint(ops, 0, t!())? }) }
        "getlocal_WC_1" => { require(ops, 1, t!())?; Ok(Insn::GetLocalWc1 { idx: uint(ops, 0, t!())? }) }
        "setlocal_WC_0" => { require(ops, 1, t!())?; Ok(Insn::SetLocalWc0 { idx: uint(ops, 0, t!())? }) }
        "setlocal_WC_1" => { require(ops, 1, t!())?; Ok(Insn::SetLocalWc1 { idx: uint(ops, 0, t!())? }) }
        "getblockparam" => {
            require(ops, 2, t!())?;
            Ok(Insn::GetBlockParam { idx: uint(ops, 0, t!())?, level: uint(ops, 1, t!())? })
        }
        "getblockparamproxy" => {
            require(ops, 2, t!())?;
            Ok(Insn::GetBlockParamProxy { idx: uint(ops, 0, t!())?, level: uint(ops, 1, t!())? })
        }
        "setblockparam" => {
            require(ops, 2, t!())?;
            Ok(Insn::SetBlockParam { idx: uint(ops, 0, t!())?, level: uint(ops, 1, t!())? })
        }
        "getinstancevariable" => {
            require(ops, 2, t!())?;
            Ok(Insn::GetInstanceVariable { name: symbol(ops, 0, t!())?, cache: cache(ops, 1, t!())? })
        }
        "setinstancevariable" => {
            require(ops, 2, t!())?;
            Ok(Insn::SetInstanceVariable { name: symbol(ops, 0, t!())?, cache: cache(ops, 1, t!())? })
        }
        "getclassvariable" => {
            require(ops, 2, t!())?;
            Ok(Insn::GetClassVariable { name: symbol(ops, 0, t!())?, cache: cache(ops, 1, t!())? })
        }
        "setclassvariable" => {
            require(ops, 2, t!())?;
            Ok(Insn::SetClassVariable { name: symbol(ops, 0, t!())?, cache: cache(ops, 1, t!())? })
        }
        "getclassvariable_legacy" => {
            require(ops, 1, t!())?;
            Ok(Insn::GetClassVariableLegacy { name: symbol(ops, 0, t!())? })
        }
        "setclassvariable_legacy" => {
            require(ops, 1, t!())?;
            Ok(Insn::SetClassVariableLegacy { name: symbol(ops, 0, t!())? })
        }
        "getglobal" => { require(ops, 1, t!())?; Ok(Insn::GetGlobal { name: symbol(ops, 0, t!())? }) }
        "setglobal" => { require(ops, 1, t!())?; Ok(Insn::SetGlobal { name: symbol(ops, 0, t!())? }) }
        "getconstant" => { require(ops, 1, t!())?; Ok(Insn::GetConstant { name: symbol(ops, 0, t!())? }) }
        "setconstant" => { require(ops, 1, t!())?; Ok(Insn::SetConstant { name: symbol(ops, 0, t!())? }) }
        "opt_getconstant_path" => {
            require(ops, 1, t!())?;
            Ok(Insn::OptGetConstantPath { names: symbols(ops, 0, t!())? })
        }
        "getspecial" => {
            require(ops, 2, t!())?;
            let tag = t!();
            let key = uint(ops, 0, tag)?;
            let kind = SpecialVarKind::from_key(uint(ops, 1, tag)?);
            Ok(Insn::GetSpecial { key, kind })
        }
        "setspecial" => { require(ops, 1, t!())?; Ok(Insn::SetSpecial { key: uint(ops, 0, t!())? }) }

        "jump" => { require(ops, 1, t!())?; Ok(Insn::Jump { label: label(ops, 0, t!())? }) }
        "branchif" => { require(ops, 1, t!())?; Ok(Insn::BranchIf { label: label(ops, 0, t!())? }) }
        "branchunless" => { require(ops, 1, t!())?; Ok(Insn::BranchUnless { label: label(ops, 0, t!())? }) }
        "branchnil" => { require(ops, 1, t!())?; Ok(Insn::BranchNil { label: label(ops, 0, t!())? }) }
        "opt_case_dispatch" => {
            require(ops, 2, t!())?;
            Ok(Insn::OptCaseDispatch {
                table: case_table(ops, 0, t!())?,
                else_label: label(ops, 1, t!())?,
            })
        }
        "leave" => { require(ops, 0, t!())?; Ok(Insn::Leave) }
        "nop" => { require(ops, 0, t!())?; Ok(Insn::Nop) }
        "throw" => {
            require(ops, 1, t!())?;
            let tag = t!();
            let code = uint(ops, 0, tag)?;
            let throw_tag = [
                ThrowTag::Return, ThrowTag::Break, ThrowTag::Next, ThrowTag::Retry,
                ThrowTag::Redo, ThrowTag::Raise, ThrowTag::Throw, ThrowTag::Fatal,
            ]
            .into_iter()
            .find(|t| *t as u32 == code)
            .ok_or(DecodeError::InvalidValue { tag: tag.to_string(), index: 0 })?;
            Ok(Insn::Throw { tag: throw_tag })
        }

        "checkmatch" => {
            require(ops, 1, t!())?;
            let tag = t!();
            let code = uint(ops, 0, tag)?;
            let kind = [CheckMatchKind::When, CheckMatchKind::Case, CheckMatchKind::Rescue]
                .into_iter()
                .find(|k| *k as u32 == code)
                .ok_or(DecodeError::InvalidValue { tag: tag.to_string(), index: 0 })?;
            Ok(Insn::CheckMatch { kind })
        }
        "checktype" => {
            require(ops, 1, t!())?;
            let tag = t!();
            let code = uint(ops, 0, tag)? as u8;
            let kind = primitive_type_from_code(code).ok_or(DecodeError::InvalidValue { tag: tag.to_string(), index: 0 })?;
            Ok(Insn::CheckType { kind })
        }
        "checkkeyword" => {
            require(ops, 2, t!())?;
            Ok(Insn::CheckKeyword { bits_idx: uint(ops, 0, t!())?, kw_idx: uint(ops, 1, t!())? })
        }
        "defined" => {
            require(ops, 3, t!())?;
            let tag = t!();
            let kind_str = rcstr(ops, 0, tag)?;
            let kind = defined_kind_from_str(&kind_str).ok_or(DecodeError::InvalidValue { tag: tag.to_string(), index: 0 })?;
            Ok(Insn::Defined { kind, name: rcstr(ops, 1, tag)?, message: value(ops, 2, tag)? })
        }

        "send" => {
            require(ops, 2, t!())?;
            Ok(Insn::Send { cd: calldata(ops, 0, t!())?, block_iseq: opt_iseq(ops, 1, t!())? })
        }
        "opt_send_without_block" => {
            require(ops, 1, t!())?;
            Ok(Insn::OptSendWithoutBlock { cd: calldata(ops, 0, t!())? })
        }
        "invokeblock" => { require(ops, 1, t!())?; Ok(Insn::InvokeBlock { cd: calldata(ops, 0, t!())? }) }
        "invokesuper" => {
            require(ops, 2, t!())?;
            Ok(Insn::InvokeSuper { cd: calldata(ops, 0, t!())?, block_iseq: opt_iseq(ops, 1, t!())? })
        }
        "defineclass" => {
            require(ops, 3, t!())?;
            Ok(Insn::DefineClass {
                name: symbol(ops, 0, t!())?,
                class_iseq: iseq(ops, 1, t!())?,
                flags: uint(ops, 2, t!())?,
            })
        }
        "definemethod" => {
            require(ops, 2, t!())?;
            Ok(Insn::DefineMethod { name: symbol(ops, 0, t!())?, iseq: iseq(ops, 1, t!())? })
        }
        "definesmethod" => {
            require(ops, 2, t!())?;
            Ok(Insn::DefineSMethod { name: symbol(ops, 0, t!())?, iseq: iseq(ops, 1, t!())? })
        }
        "once" => {
            require(ops, 1, t!())?;
            Ok(Insn::Once {
                iseq: iseq(ops, 0, t!())?,
                cache: Rc::new(std::cell::RefCell::new(None)),
            })
        }

        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

fn primitive_type_from_code(code: u8) -> Option<PrimitiveType> {
    Some(match code {
        1 => PrimitiveType::Class,
        2 => PrimitiveType::Module,
        3 => PrimitiveType::Float,
        4 => PrimitiveType::String,
        5 => PrimitiveType::Regexp,
        6 => PrimitiveType::Array,
        7 => PrimitiveType::Hash,
        8 => PrimitiveType::Struct,
        9 => PrimitiveType::Reserved(9),
        10 => PrimitiveType::Complex,
        11 => PrimitiveType::Rational,
        12 => PrimitiveType::Nil,
        13 => PrimitiveType::True,
        14 => PrimitiveType::False,
        15 => PrimitiveType::Symbol,
        16 => PrimitiveType::Fixnum,
        _ => return None,
    })
}

fn defined_kind_from_str(s: &str) -> Option<DefinedKind> {
    Some(match s {
        "nil" => DefinedKind::Nil,
        "ivar" => DefinedKind::Ivar,
        "lvar" => DefinedKind::Lvar,
        "gvar" => DefinedKind::Gvar,
        "cvar" => DefinedKind::Cvar,
        "const" => DefinedKind::Const,
        "method" => DefinedKind::Method,
        "yield" => DefinedKind::Yield,
        "zsuper" => DefinedKind::ZSuper,
        "self" => DefinedKind::SelfKw,
        "true" => DefinedKind::True,
        "false" => DefinedKind::False,
        "asgn" => DefinedKind::Asgn,
        "expr" => DefinedKind::Expr,
        "ref" => DefinedKind::Ref,
        "func" => DefinedKind::Func,
        "const-from" => DefinedKind::ConstFrom,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use yarv_calldata::CallDataFlags;

    fn roundtrip(insn: Insn) {
        let a = insn.to_a();
        let tag = match &a[0] {
            Operand::Str(s) => s.to_string(),
            _ => panic!("first operand must be the tag"),
        };
        let decoded = Insn::from_array(&tag, &a[1..]).expect("decode");
        assert_eq!(format!("{decoded:?}"), format!("{insn:?}"));
    }

    #[test]
    fn nullary_instructions_round_trip() {
        roundtrip(Insn::Pop);
        roundtrip(Insn::Leave);
        roundtrip(Insn::PutSelf);
    }

    #[test]
    fn instructions_with_scalar_operands_round_trip() {
        roundtrip(Insn::DupN { n: 4 });
        roundtrip(Insn::GetLocal { idx: 1, level: 2 });
        roundtrip(Insn::PutObject { value: Value::Int(42) });
    }

    #[test]
    fn send_round_trips_with_and_without_a_block() {
        let cd = CallData::new("foo", 1, CallDataFlags::FCALL);
        roundtrip(Insn::Send { cd: cd.clone(), block_iseq: None });
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Insn::from_array("bogus_opcode", &[]).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTag(_)));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = Insn::from_array("dupn", &[]).unwrap_err();
        assert!(matches!(err, DecodeError::WrongArity { .. }));
    }

    #[test]
    fn opt_plus_decodes_through_the_arith_table() {
        let cd = CallData::new("+", 1, CallDataFlags::OPT_SEND);
        let insn = Insn::OptArith { op: ArithOp::Plus, cd };
        roundtrip(insn);
    }
}
