use yarv_primitives::Symbol;

/// An iseq's local variable table.
///
/// Internally, opcodes address locals by a "slot" index counting down from
/// the frame's most-recently-declared local (slot `0`); this matches how
/// `getlocal`/`setlocal` are actually indexed by a real compiler. The
/// external serialized/disassembled form instead reports the "offset":
/// a positive integer counting up from the bottom of the table, which is
/// what the reference disassembler prints. [`LocalTable::offset`] converts
/// between the two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalTable {
    names: Vec<Symbol>,
}

impl LocalTable {
    pub fn new(names: Vec<Symbol>) -> Self {
        LocalTable { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name_at(&self, slot: u32) -> Option<&Symbol> {
        self.names.get(slot as usize)
    }

    pub fn index_of(&self, name: &Symbol) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|i| i as u32)
    }

    /// Converts an internal slot index into the bottom-counted offset used
    /// by `to_a`/disassembly.
    pub fn offset(&self, slot: u32) -> u32 {
        self.len() as u32 - slot - 1
    }

    /// Inverse of [`LocalTable::offset`].
    pub fn slot_of_offset(&self, offset: u32) -> u32 {
        self.len() as u32 - offset - 1
    }

    pub fn push(&mut self, name: Symbol) -> u32 {
        self.names.push(name);
        (self.names.len() - 1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_counts_from_the_bottom() {
        let mut t = LocalTable::default();
        t.push(Symbol::intern("a"));
        t.push(Symbol::intern("b"));
        t.push(Symbol::intern("c"));
        // slot 0 is the most-recently-declared local ("c"), offset from
        // the bottom is len - 1 = 2.
        assert_eq!(t.offset(0), 2);
        assert_eq!(t.offset(2), 0);
        assert_eq!(t.slot_of_offset(t.offset(1)), 1);
    }
}
