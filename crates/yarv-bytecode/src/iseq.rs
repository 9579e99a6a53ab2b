use std::rc::Rc;

use yarv_primitives::Symbol;

use crate::insn::{Insn, ThrowTag};
use crate::label::Label;
use crate::local_table::LocalTable;

/// What kind of unit an iseq compiles: top-level program, a method body, a
/// block, a class/module body, a `rescue`/`ensure` clause body, a `eval`
/// string, or the implicit `main` wrapper iseq.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IseqType {
    Top,
    Method,
    Block,
    Class,
    Rescue,
    Ensure,
    Eval,
    Main,
}

impl IseqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IseqType::Top => "top",
            IseqType::Method => "method",
            IseqType::Block => "block",
            IseqType::Class => "class",
            IseqType::Rescue => "rescue",
            IseqType::Ensure => "ensure",
            IseqType::Eval => "eval",
            IseqType::Main => "main",
        }
    }
}

/// A catch-table entry: while the program counter is within `[start, end)`
/// in this iseq, a `throw` carrying `tag` transfers control to `target`.
#[derive(Debug, Clone)]
pub struct CatchEntry {
    pub tag: ThrowTag,
    pub start: usize,
    pub end: usize,
    pub target: Label,
    /// iseq to run for a `rescue`/`ensure` catch entry (evaluated as its
    /// own frame before control resumes at `target`); `None` for simple
    /// `break`/`next`/`redo`/`retry` entries that just jump.
    pub iseq: Option<Rc<Iseq>>,
}

/// A compiled unit: a sequence of opcodes plus the metadata they need
/// (local table, lexical parent, catch table, self-serialization).
#[derive(Debug)]
pub struct Iseq {
    pub name: String,
    pub kind: IseqType,
    pub local_table: LocalTable,
    pub parent: Option<Rc<Iseq>>,
    pub insns: Vec<Insn>,
    pub catch_table: Vec<CatchEntry>,
}

impl Iseq {
    pub fn new(name: impl Into<String>, kind: IseqType, local_table: LocalTable) -> Self {
        Iseq {
            name: name.into(),
            kind,
            local_table,
            parent: None,
            insns: Vec::new(),
            catch_table: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: Rc<Iseq>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn resolve_local(&self, name: &Symbol) -> Option<u32> {
        self.local_table.index_of(name)
    }

    /// Total encoded length of the instruction stream, in the sense of
    /// `length`-summed slots (used by basic-block/jump-target analyses).
    pub fn encoded_length(&self) -> usize {
        self.insns.iter().map(|insn| Insn::length(insn) as usize).sum()
    }

    /// Finds the catch-table entry (if any) covering `pc` for `tag`, the
    /// innermost (last-registered, matching the reference engine's
    /// lexical-innermost-wins convention) entry winning on overlap.
    pub fn catch_entry_for(&self, pc: usize, tag: ThrowTag) -> Option<&CatchEntry> {
        self.catch_table
            .iter()
            .rev()
            .find(|entry| entry.tag == tag && entry.start <= pc && pc < entry.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insn::Insn;

    #[test]
    fn encoded_length_sums_instruction_widths() {
        let iseq = Iseq::new("<main>", IseqType::Main, LocalTable::default());
        assert_eq!(iseq.encoded_length(), 0);
        let mut iseq = iseq;
        iseq.insns.push(Insn::PutNil);
        iseq.insns.push(Insn::Leave);
        assert_eq!(
            iseq.encoded_length(),
            (Insn::PutNil.length() + Insn::Leave.length()) as usize
        );
    }
}
