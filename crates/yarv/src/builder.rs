//! A hand-assembler for [`Iseq`]s: the "interface the compiler is a
//! consumer of" that spec.md §1 carves out as an explicit non-goal.
//! Nothing here parses source; it lets a caller (a test, or eventually a
//! real compiler) emit the exact instruction sequences spec.md §8's
//! end-to-end scenarios describe by hand.

use std::rc::Rc;

use yarv_bytecode::{CatchEntry, Insn, Iseq, IseqType, Label, LocalTable};
use yarv_primitives::Symbol;

use crate::AssembleError;

/// Assembles one [`Iseq`]. Declare every local the body needs up front
/// with [`IseqBuilder::with_locals`] before emitting `getlocal`/`setlocal`
/// against it — `local_slot` resolves a name against the *final* table, so
/// locals declared after code that already referenced a slot would shift
/// every previously computed slot out from under it.
pub struct IseqBuilder {
    name: String,
    kind: IseqType,
    local_table: LocalTable,
    parent: Option<Rc<Iseq>>,
    insns: Vec<Insn>,
    catch_table: Vec<CatchEntry>,
}

impl IseqBuilder {
    pub fn new(name: impl Into<String>, kind: IseqType) -> Self {
        IseqBuilder {
            name: name.into(),
            kind,
            local_table: LocalTable::default(),
            parent: None,
            insns: Vec::new(),
            catch_table: Vec::new(),
        }
    }

    pub fn with_locals(mut self, names: &[&str]) -> Self {
        for name in names {
            self.local_table.push(Symbol::intern(name));
        }
        self
    }

    pub fn with_parent(mut self, parent: Rc<Iseq>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The `getlocal`/`setlocal` slot for a name declared via
    /// `with_locals`, i.e. the inverse of [`yarv_bytecode::LocalTable::offset`].
    pub fn local_slot(&self, name: &str) -> Result<u32, AssembleError> {
        let idx = self
            .local_table
            .index_of(&Symbol::intern(name))
            .ok_or_else(|| AssembleError::UndeclaredLocal(name.to_string()))?;
        Ok(self.local_table.offset(idx))
    }

    /// Creates an unbound jump target. Bind it with [`IseqBuilder::bind`]
    /// at the instruction it should resolve to.
    pub fn label(&self, name: impl Into<String>) -> Label {
        Label::new(name)
    }

    /// Binds `label` to the position the *next* `emit` call will occupy.
    pub fn bind(&mut self, label: &Label) -> &mut Self {
        label.bind(self.insns.len());
        self
    }

    pub fn emit(&mut self, insn: Insn) -> &mut Self {
        self.insns.push(insn);
        self
    }

    pub fn catch(&mut self, entry: CatchEntry) -> &mut Self {
        self.catch_table.push(entry);
        self
    }

    pub fn finish(self) -> Rc<Iseq> {
        let mut iseq = Iseq::new(self.name, self.kind, self.local_table);
        if let Some(parent) = self.parent {
            iseq = iseq.with_parent(parent);
        }
        iseq.insns = self.insns;
        iseq.catch_table = self.catch_table;
        Rc::new(iseq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yarv_primitives::Value;

    #[test]
    fn local_slot_resolves_against_the_final_table() {
        let b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a", "b", "c"]);
        // "a" was declared first, so it sits at the bottom of the table:
        // offset 0, slot len-1 = 2.
        assert_eq!(b.local_slot("a").unwrap(), 2);
        assert_eq!(b.local_slot("c").unwrap(), 0);
    }

    #[test]
    fn local_slot_rejects_an_undeclared_name() {
        let b = IseqBuilder::new("<main>", IseqType::Main).with_locals(&["a"]);
        assert!(matches!(b.local_slot("missing"), Err(AssembleError::UndeclaredLocal(name)) if name == "missing"));
    }

    #[test]
    fn emit_and_finish_build_a_runnable_iseq() {
        let mut b = IseqBuilder::new("<main>", IseqType::Main);
        b.emit(Insn::PutObject { value: Value::Int(42) }).emit(Insn::Leave);
        let iseq = b.finish();
        assert_eq!(iseq.insns.len(), 2);
    }
}
