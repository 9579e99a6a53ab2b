//! A first-class global variable table keyed by symbol.
//!
//! The reference implementation reaches for host-language eval to read
//! and write globals because it has no reflective global-variable API
//! (top-level spec's design notes); this is the "clean implementation"
//! the spec prescribes instead.

use std::cell::RefCell;
use std::collections::HashMap;

use yarv_primitives::{Symbol, Value};

#[derive(Default)]
pub struct GlobalTable {
    vars: RefCell<HashMap<Symbol, Value>>,
}

impl GlobalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &Symbol) -> Value {
        self.vars.borrow().get(name).cloned().unwrap_or(Value::Nil)
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.vars.borrow().contains_key(name)
    }

    pub fn set(&self, name: Symbol, value: Value) {
        self.vars.borrow_mut().insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_global_reads_as_nil() {
        let g = GlobalTable::new();
        assert_eq!(g.get(&Symbol::intern("$x")), Value::Nil);
    }

    #[test]
    fn set_then_get_round_trips() {
        let g = GlobalTable::new();
        g.set(Symbol::intern("$x"), Value::Int(5));
        assert_eq!(g.get(&Symbol::intern("$x")), Value::Int(5));
    }
}
