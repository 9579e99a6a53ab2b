//! Textual disassembly (spec.md §6).
//!
//! Each opcode renders one line `"<mnemonic> <operands ...>"` via a
//! [`Formatter`] that also knows how to pretty-print labels, calldata,
//! objects and embedded iseqs. Opcodes that embed a child iseq enqueue it
//! with the formatter so a caller can emit it after the parent, mirroring
//! how the reference disassembler lays out method/block/class bodies.

use std::rc::Rc;

use crate::iseq::Iseq;
use crate::label::Label;
use yarv_calldata::CallData;
use yarv_primitives::{Symbol, Value};

use super::Insn;

/// Pretty-printing + child-iseq collection hook used by [`Disasm`].
pub trait Formatter {
    fn label(&mut self, label: &Label) -> String {
        format!("{}", label.name())
    }

    fn value(&mut self, value: &Value) -> String {
        value.inspect()
    }

    fn symbol(&mut self, sym: &Symbol) -> String {
        format!(":{sym}")
    }

    fn calldata(&mut self, cd: &CallData) -> String {
        format!("<calldata:{} argc:{}>", cd.method, cd.argc)
    }

    /// Registers a child iseq to be rendered after the current one.
    fn enqueue_iseq(&mut self, iseq: Rc<Iseq>);
}

/// A plain text formatter collecting child iseqs in encounter order.
#[derive(Default)]
pub struct TextFormatter {
    pub pending: Vec<Rc<Iseq>>,
}

impl Formatter for TextFormatter {
    fn enqueue_iseq(&mut self, iseq: Rc<Iseq>) {
        self.pending.push(iseq);
    }
}

pub trait Disasm {
    /// Renders this instruction as one disassembly line.
    fn disasm(&self, f: &mut dyn Formatter) -> String;
}

impl Disasm for Insn {
    fn disasm(&self, f: &mut dyn Formatter) -> String {
        let mnemonic = self.tag();
        let operands = self.disasm_operands(f);
        if operands.is_empty() {
            mnemonic.to_string()
        } else {
            format!("{mnemonic} {}", operands.join(", "))
        }
    }
}

impl Insn {
    /// The opcode's lowercase symbol tag, as used by both disassembly and
    /// `to_a` serialization (spec.md §6).
    pub fn tag(&self) -> &'static str {
        use Insn::*;
        match self {
            Pop => "pop",
            Dup => "dup",
            DupN { .. } => "dupn",
            Swap => "swap",
            TopN { .. } => "topn",
            SetN { .. } => "setn",
            AdjustStack { .. } => "adjuststack",

            PutNil => "putnil",
            PutSelf => "putself",
            PutObject { .. } => "putobject",
            PutObjectInt2Fix0 => "putobject_INT2FIX_0_",
            PutObjectInt2Fix1 => "putobject_INT2FIX_1_",
            PutString { .. } => "putstring",
            DupArray { .. } => "duparray",
            DupHash { .. } => "duphash",
            PutSpecialObject { .. } => "putspecialobject",

            OptArith { op, .. } => op.tag(),
            OptNeq { .. } => "opt_neq",
            OptNewArrayMax { .. } => "opt_newarray_max",
            OptNewArrayMin { .. } => "opt_newarray_min",
            OptArefWith { .. } => "opt_aref_with",
            OptAsetWith { .. } => "opt_aset_with",
            OptStrFreeze { .. } => "opt_str_freeze",
            OptStrUminus { .. } => "opt_str_uminus",

            ConcatStrings { .. } => "concatstrings",
            AnyToString => "anytostring",
            ObjToString { .. } => "objtostring",
            Intern => "intern",
            ToRegexp { .. } => "toregexp",
            NewRange { .. } => "newrange",

            NewArray { .. } => "newarray",
            NewArrayKwSplat { .. } => "newarraykwsplat",
            NewHash { .. } => "newhash",
            ConcatArray => "concatarray",
            SplatArray { .. } => "splatarray",
            ExpandArray { .. } => "expandarray",

            GetLocal { .. } => "getlocal",
            SetLocal { .. } => "setlocal",
            GetLocalWc0 { .. } => "getlocal_WC_0",
            GetLocalWc1 { .. } => "getlocal_WC_1",
            SetLocalWc0 { .. } => "setlocal_WC_0",
            SetLocalWc1 { .. } => "setlocal_WC_1",
            GetBlockParam { .. } => "getblockparam",
            GetBlockParamProxy { .. } => "getblockparamproxy",
            SetBlockParam { .. } => "setblockparam",
            GetInstanceVariable { .. } => "getinstancevariable",
            SetInstanceVariable { .. } => "setinstancevariable",
            GetClassVariable { .. } => "getclassvariable",
            SetClassVariable { .. } => "setclassvariable",
            GetClassVariableLegacy { .. } => "getclassvariable_legacy",
            SetClassVariableLegacy { .. } => "setclassvariable_legacy",
            GetGlobal { .. } => "getglobal",
            SetGlobal { .. } => "setglobal",
            GetConstant { .. } => "getconstant",
            SetConstant { .. } => "setconstant",
            OptGetConstantPath { .. } => "opt_getconstant_path",
            GetSpecial { .. } => "getspecial",
            SetSpecial { .. } => "setspecial",

            Jump { .. } => "jump",
            BranchIf { .. } => "branchif",
            BranchUnless { .. } => "branchunless",
            BranchNil { .. } => "branchnil",
            OptCaseDispatch { .. } => "opt_case_dispatch",
            Leave => "leave",
            Nop => "nop",
            Throw { .. } => "throw",

            CheckMatch { .. } => "checkmatch",
            CheckType { .. } => "checktype",
            CheckKeyword { .. } => "checkkeyword",
            Defined { .. } => "defined",

            Send { .. } => "send",
            OptSendWithoutBlock { .. } => "opt_send_without_block",
            InvokeBlock { .. } => "invokeblock",
            InvokeSuper { .. } => "invokesuper",
            DefineClass { .. } => "defineclass",
            DefineMethod { .. } => "definemethod",
            DefineSMethod { .. } => "definesmethod",
            Once { .. } => "once",
        }
    }

    fn disasm_operands(&self, f: &mut dyn Formatter) -> Vec<String> {
        use Insn::*;
        match self {
            Pop | Dup | Swap | PutNil | PutSelf | PutObjectInt2Fix0 | PutObjectInt2Fix1
            | AnyToString | Intern | ConcatArray | Leave | Nop | DefineMethod { .. }
            | DefineSMethod { .. } => vec![],

            DupN { n } | TopN { n } | SetN { n } | AdjustStack { n } => vec![n.to_string()],
            PutObject { value } => vec![f.value(value)],
            PutString { value } => vec![format!("{value:?}")],
            DupArray { value } => vec![format!("{value:?}")],
            DupHash { value } => vec![format!("{value:?}")],
            PutSpecialObject { kind } => vec![format!("{kind:?}")],

            OptArith { cd, .. } => vec![f.calldata(cd)],
            OptNeq { eq_cd, neq_cd } => vec![f.calldata(eq_cd), f.calldata(neq_cd)],
            OptNewArrayMax { n } | OptNewArrayMin { n } => vec![n.to_string()],
            OptArefWith { key, cd } | OptAsetWith { key, cd } => {
                vec![format!("{key:?}"), f.calldata(cd)]
            }
            OptStrFreeze { value, cd } | OptStrUminus { value, cd } => {
                vec![format!("{value:?}"), f.calldata(cd)]
            }

            ConcatStrings { n } => vec![n.to_string()],
            ObjToString { cd } => vec![f.calldata(cd)],
            ToRegexp { opts, n } => vec![opts.to_string(), n.to_string()],
            NewRange { exclusive } => vec![exclusive.to_string()],

            NewArray { n } | NewArrayKwSplat { n } | NewHash { n } => vec![n.to_string()],
            SplatArray { flag } => vec![flag.to_string()],
            ExpandArray { n, flags } => vec![n.to_string(), flags.to_string()],

            GetLocal { idx, level } | SetLocal { idx, level } => {
                vec![idx.to_string(), level.to_string()]
            }
            GetLocalWc0 { idx } | GetLocalWc1 { idx } | SetLocalWc0 { idx } | SetLocalWc1 { idx } => {
                vec![idx.to_string()]
            }
            GetBlockParam { idx, level }
            | GetBlockParamProxy { idx, level }
            | SetBlockParam { idx, level } => vec![idx.to_string(), level.to_string()],
            GetInstanceVariable { name, .. }
            | SetInstanceVariable { name, .. }
            | GetClassVariable { name, .. }
            | SetClassVariable { name, .. }
            | GetClassVariableLegacy { name }
            | SetClassVariableLegacy { name }
            | GetGlobal { name }
            | SetGlobal { name }
            | GetConstant { name }
            | SetConstant { name } => vec![f.symbol(name)],
            OptGetConstantPath { names } => {
                vec![format!(
                    "[{}]",
                    names
                        .iter()
                        .map(|n| f.symbol(n))
                        .collect::<Vec<_>>()
                        .join(", ")
                )]
            }
            GetSpecial { key, kind } => vec![key.to_string(), format!("{kind:?}")],
            SetSpecial { key } => vec![key.to_string()],

            Jump { label } | BranchIf { label } | BranchUnless { label } | BranchNil { label } => {
                vec![f.label(label)]
            }
            OptCaseDispatch { table, else_label } => vec![
                format!(
                    "{{{}}}",
                    table
                        .iter()
                        .map(|(v, l)| format!("{}=>{}", f.value(v), f.label(l)))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                f.label(else_label),
            ],
            Throw { tag } => vec![tag.as_str().to_string()],

            CheckMatch { kind } => vec![format!("{kind:?}")],
            CheckType { kind } => vec![format!("{kind:?}")],
            CheckKeyword { bits_idx, kw_idx } => vec![bits_idx.to_string(), kw_idx.to_string()],
            Defined { kind, name, message } => {
                vec![kind.as_str().to_string(), name.to_string(), f.value(message)]
            }

            Send { cd, block_iseq } => {
                let mut ops = vec![f.calldata(cd)];
                if let Some(iseq) = block_iseq {
                    ops.push(format!("<iseq:{}>", iseq.name));
                    f.enqueue_iseq(iseq.clone());
                } else {
                    ops.push("nil".to_string());
                }
                ops
            }
            OptSendWithoutBlock { cd } => vec![f.calldata(cd)],
            InvokeBlock { cd } => vec![f.calldata(cd)],
            InvokeSuper { cd, block_iseq } => {
                let mut ops = vec![f.calldata(cd)];
                if let Some(iseq) = block_iseq {
                    ops.push(format!("<iseq:{}>", iseq.name));
                    f.enqueue_iseq(iseq.clone());
                } else {
                    ops.push("nil".to_string());
                }
                ops
            }
            DefineClass { name, class_iseq, flags } => {
                f.enqueue_iseq(class_iseq.clone());
                vec![
                    f.symbol(name),
                    format!("<iseq:{}>", class_iseq.name),
                    flags.to_string(),
                ]
            }
            DefineMethod { .. } | DefineSMethod { .. } => unreachable!("handled above"),
            Once { iseq, .. } => {
                f.enqueue_iseq(iseq.clone());
                vec![format!("<iseq:{}>", iseq.name)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_instruction_has_no_operands() {
        let mut f = TextFormatter::default();
        assert_eq!(Insn::Pop.disasm(&mut f), "pop");
    }

    #[test]
    fn instruction_with_operands_renders_them() {
        let mut f = TextFormatter::default();
        let line = Insn::DupN { n: 3 }.disasm(&mut f);
        assert_eq!(line, "dupn 3");
    }
}
