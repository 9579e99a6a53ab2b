//! The "any host object" escape hatch named in the value-domain spec.
//!
//! `yarv-primitives` knows nothing about classes, user-defined methods or
//! blocks/procs — those are runtime concepts owned by `yarv-interpreter`.
//! Rather than create a dependency cycle (the interpreter needs `Value` to
//! describe locals and the stack; `Value` would otherwise need the
//! interpreter's `Iseq`/frame types to describe a block), objects with
//! behavior are boxed behind this trait and carried as `Value::Foreign`.
//! The interpreter downcasts via [`ForeignObject::as_any`] when it needs
//! the concrete type back.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A host-side object reachable from a [`crate::Value`] but opaque to
/// `yarv-primitives` itself.
pub trait ForeignObject: fmt::Debug {
    /// Name used in `checktype`/`defined`/error messages (e.g. `"Class"`,
    /// `"Proc"`, `"Method"`).
    fn type_name(&self) -> &'static str;

    /// Ruby-style `to_s` conversion.
    fn to_s(&self) -> String;

    /// Downcasting hook for borrowed access.
    fn as_any(&self) -> &dyn Any;

    /// Downcasting hook for owned access, for the rare caller that needs
    /// to keep an `Rc<ConcreteType>` rather than a borrow (e.g. rebinding
    /// a block onto a frame). Every impl's body is just `self` — a plain
    /// `Rc<Concrete>` -> `Rc<dyn Any>` unsizing coercion — but each
    /// concrete type has to provide it; a blanket default can't be
    /// reached through `Rc<dyn ForeignObject>` itself.
    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any>;

    /// Identity comparison; the default (pointer-independent) value
    /// equality for foreign objects is "same concrete object", which
    /// callers implement by comparing `as_any` downcasts or by wrapping
    /// the same `Rc` — this method exists so `Value::PartialEq` has
    /// something to call without downcasting to every possible type.
    fn same_identity(&self, other: &dyn ForeignObject) -> bool {
        std::ptr::eq(
            self.as_any() as *const dyn Any as *const (),
            other.as_any() as *const dyn Any as *const (),
        )
    }
}
