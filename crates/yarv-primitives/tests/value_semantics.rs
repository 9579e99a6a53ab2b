//! Cross-module scenarios over `Value`, `Symbol`, and `ForeignObject`
//! together, the way `yarv-interpreter`'s opcodes observe them.

use std::any::Any;
use std::rc::Rc;

use yarv_primitives::{ForeignObject, Symbol, Value};

#[derive(Debug)]
struct Widget(&'static str);

impl ForeignObject for Widget {
    fn type_name(&self) -> &'static str {
        "Widget"
    }

    fn to_s(&self) -> String {
        format!("#<Widget:{}>", self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

#[test]
fn symbols_with_the_same_name_intern_to_the_same_value() {
    let a = Symbol::intern("greet");
    let b = Symbol::intern("greet");
    assert_eq!(a, b);
}

#[test]
fn arrays_compare_structurally_not_by_identity() {
    let a = Value::array(vec![Value::Int(1), Value::string("x")]);
    let b = Value::array(vec![Value::Int(1), Value::string("x")]);
    assert_eq!(a, b);
}

#[test]
fn hash_values_compare_as_ordered_pair_lists() {
    let a = Value::hash(vec![(Value::symbol("a"), Value::Int(1)), (Value::symbol("b"), Value::Int(2))]);
    let b = Value::hash(vec![(Value::symbol("a"), Value::Int(1)), (Value::symbol("b"), Value::Int(2))]);
    let reordered = Value::hash(vec![(Value::symbol("b"), Value::Int(2)), (Value::symbol("a"), Value::Int(1))]);
    assert_eq!(a, b);
    assert_ne!(a, reordered);
}

#[test]
fn foreign_values_round_trip_through_to_s_and_class_name() {
    let v = Value::Foreign(Rc::new(Widget("gizmo")));
    assert_eq!(v.to_s(), "#<Widget:gizmo>");
    assert_eq!(v.class_name(), "Widget");
}

#[test]
fn falsy_values_are_exactly_nil_and_false() {
    assert!(!Value::Nil.truthy());
    assert!(!Value::Bool(false).truthy());
    assert!(Value::Bool(true).truthy());
    assert!(Value::Int(0).truthy());
}
