//! Concrete [`ForeignObject`] implementations: the pieces of the object
//! universe that need to know about iseqs, classes and methods, and so
//! can't live in `yarv-primitives` without it depending back on this
//! crate (see that crate's `foreign` module for the escape hatch).

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use yarv_bytecode::Iseq;
use yarv_primitives::{ForeignObject, Symbol, Value};

use crate::frame::Frame;

/// A class or module. Holds its own method table and a superclass link;
/// constant lookup walks this chain plus the defining iseq's lexical
/// nesting (see `Vm::const_get`).
pub struct ClassObject {
    pub name: RefCell<String>,
    pub superclass: RefCell<Option<Rc<ClassObject>>>,
    pub is_module: bool,
    pub methods: RefCell<HashMap<Symbol, Rc<MethodObject>>>,
    /// Singleton ("class") methods, reached via `def self.foo` /
    /// `definesmethod`. Checked before `methods` when the receiver is the
    /// class object itself.
    pub smethods: RefCell<HashMap<Symbol, Rc<MethodObject>>>,
    pub constants: RefCell<HashMap<Symbol, Value>>,
    /// Class variables (`@@foo`), shared down the inheritance chain the
    /// way Ruby's are.
    pub cvars: RefCell<HashMap<Symbol, Value>>,
    /// Instance variables on the class object itself, as a singleton
    /// object (used when a class-body frame reads/writes `@foo`).
    pub ivars: RefCell<HashMap<Symbol, Value>>,
    static_name: Cell<Option<&'static str>>,
}

impl ClassObject {
    pub fn new(name: impl Into<String>, superclass: Option<Rc<ClassObject>>, is_module: bool) -> Rc<Self> {
        Rc::new(ClassObject {
            name: RefCell::new(name.into()),
            superclass: RefCell::new(superclass),
            is_module,
            methods: RefCell::new(HashMap::new()),
            smethods: RefCell::new(HashMap::new()),
            constants: RefCell::new(HashMap::new()),
            cvars: RefCell::new(HashMap::new()),
            ivars: RefCell::new(HashMap::new()),
            static_name: Cell::new(None),
        })
    }

    /// Walks the superclass chain looking up a class variable (Ruby
    /// shares `@@foo` across a hierarchy rather than scoping it per
    /// class).
    pub fn cvar_get(&self, name: &Symbol) -> Option<Value> {
        if let Some(v) = self.cvars.borrow().get(name) {
            return Some(v.clone());
        }
        self.superclass.borrow().as_ref()?.cvar_get(name)
    }

    /// Sets a class variable on the nearest ancestor that already
    /// declares it, or on `self` if none does.
    pub fn cvar_set(&self, name: &Symbol, value: Value) {
        let mut cur = self.superclass.borrow().clone();
        while let Some(c) = cur {
            if c.cvars.borrow().contains_key(name) {
                c.cvars.borrow_mut().insert(name.clone(), value);
                return;
            }
            cur = c.superclass.borrow().clone();
        }
        self.cvars.borrow_mut().insert(name.clone(), value);
    }

    /// A `'static` copy of this class's name, used where `ForeignObject`
    /// requires `&'static str` (e.g. `InstanceObject::type_name`). Leaked
    /// once per class, not per instance.
    pub fn static_name(&self) -> &'static str {
        if let Some(s) = self.static_name.get() {
            return s;
        }
        let s: &'static str = Box::leak(self.name.borrow().clone().into_boxed_str());
        self.static_name.set(Some(s));
        s
    }

    /// Method resolution order lookup: self, then superclass chain.
    pub fn resolve_method(&self, name: &Symbol) -> Option<Rc<MethodObject>> {
        if let Some(m) = self.methods.borrow().get(name) {
            return Some(m.clone());
        }
        self.superclass.borrow().as_ref()?.resolve_method(name)
    }

    /// Resolution starting one level above `from`, for `invokesuper`.
    /// `self` is the receiver's actual class; the chain is walked down
    /// until `from` (the class that defined the currently executing
    /// method) is found, then lookup resumes from its superclass.
    pub fn resolve_super(&self, from: &ClassObject, name: &Symbol) -> Option<Rc<MethodObject>> {
        if std::ptr::eq(self, from) {
            return self.superclass.borrow().as_ref()?.resolve_method(name);
        }
        self.superclass.borrow().as_ref()?.resolve_super(from, name)
    }
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassObject({})", self.name.borrow())
    }
}

impl ForeignObject for ClassObject {
    fn type_name(&self) -> &'static str {
        if self.is_module {
            "Module"
        } else {
            "Class"
        }
    }

    fn to_s(&self) -> String {
        self.name.borrow().clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A user-defined method: an iseq plus the class it was bound under.
#[derive(Debug)]
pub struct MethodObject {
    pub name: Symbol,
    pub iseq: Rc<Iseq>,
    pub owner: RefCell<Option<Rc<ClassObject>>>,
}

impl MethodObject {
    pub fn new(name: Symbol, iseq: Rc<Iseq>) -> Rc<Self> {
        Rc::new(MethodObject { name, iseq, owner: RefCell::new(None) })
    }
}

impl ForeignObject for MethodObject {
    fn type_name(&self) -> &'static str {
        "Method"
    }

    fn to_s(&self) -> String {
        format!("#<Method: {}>", self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A block/proc: an iseq closing over the frame it was created in.
pub struct BlockObject {
    pub iseq: Rc<Iseq>,
    pub captured_frame: Rc<Frame>,
}

impl fmt::Debug for BlockObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockObject({})", self.iseq.name)
    }
}

impl ForeignObject for BlockObject {
    fn type_name(&self) -> &'static str {
        "Proc"
    }

    fn to_s(&self) -> String {
        format!("#<Proc: {}>", self.iseq.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A thin, non-materializing handle to a block parameter (`getblockparam_proxy`).
/// Unlike [`BlockObject`], which `getblockparam` resolves and clones
/// eagerly, this defers the lookup to call time: it only remembers which
/// frame and lexical level to ask, so pushing one costs nothing beyond the
/// `Rc` itself and is only ever useful for invocation.
pub struct BlockParamProxy {
    frame: Rc<Frame>,
    level: u32,
}

impl BlockParamProxy {
    pub fn new(frame: Rc<Frame>, level: u32) -> Rc<Self> {
        Rc::new(BlockParamProxy { frame, level })
    }

    /// Resolves the proxy against its captured frame, materializing the
    /// block it currently refers to, or `None` if no block was passed.
    pub fn resolve(&self) -> Option<Rc<BlockObject>> {
        self.frame.block_get(self.level)
    }
}

impl fmt::Debug for BlockParamProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockParamProxy(level={})", self.level)
    }
}

impl ForeignObject for BlockParamProxy {
    fn type_name(&self) -> &'static str {
        "BlockParamProxy"
    }

    fn to_s(&self) -> String {
        "#<BlockParamProxy>".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// An instance of a user-defined class: its class pointer plus an
/// instance-variable table.
pub struct InstanceObject {
    pub class: Rc<ClassObject>,
    pub ivars: RefCell<HashMap<Symbol, Value>>,
}

impl InstanceObject {
    pub fn new(class: Rc<ClassObject>) -> Rc<Self> {
        Rc::new(InstanceObject { class, ivars: RefCell::new(HashMap::new()) })
    }
}

impl fmt::Debug for InstanceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}>", self.class.name.borrow())
    }
}

impl ForeignObject for InstanceObject {
    fn type_name(&self) -> &'static str {
        self.class.static_name()
    }

    fn to_s(&self) -> String {
        format!("#<{}>", self.class.name.borrow())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

pub fn class_value(class: Rc<ClassObject>) -> Value {
    Value::Foreign(class)
}

/// Borrows the [`ClassObject`] out of a `Value::Foreign(Rc<ClassObject>)`.
pub fn as_class(value: &Value) -> Option<&ClassObject> {
    match value {
        Value::Foreign(obj) => obj.as_any().downcast_ref::<ClassObject>(),
        _ => None,
    }
}

pub fn as_instance(value: &Value) -> Option<&InstanceObject> {
    match value {
        Value::Foreign(obj) => obj.as_any().downcast_ref::<InstanceObject>(),
        _ => None,
    }
}

pub fn as_block(value: &Value) -> Option<&BlockObject> {
    match value {
        Value::Foreign(obj) => obj.as_any().downcast_ref::<BlockObject>(),
        _ => None,
    }
}

pub fn as_method(value: &Value) -> Option<&MethodObject> {
    match value {
        Value::Foreign(obj) => obj.as_any().downcast_ref::<MethodObject>(),
        _ => None,
    }
}

/// Owned variants of the above, for the few callers that need to keep the
/// `Rc` itself (rebinding a block parameter, storing a resolved
/// superclass) rather than just borrow through it. Routed through
/// [`ForeignObject::as_any_rc`] rather than `Vm`'s name-keyed class
/// registry, since a block or method has no name to look it up by.
pub fn as_class_owned(value: &Value) -> Option<Rc<ClassObject>> {
    match value {
        Value::Foreign(obj) if obj.as_any().is::<ClassObject>() => {
            Some(obj.clone().as_any_rc().downcast::<ClassObject>().expect("type checked above"))
        }
        _ => None,
    }
}

pub fn as_block_owned(value: &Value) -> Option<Rc<BlockObject>> {
    match value {
        Value::Foreign(obj) if obj.as_any().is::<BlockObject>() => {
            Some(obj.clone().as_any_rc().downcast::<BlockObject>().expect("type checked above"))
        }
        _ => None,
    }
}

pub fn as_block_param_proxy(value: &Value) -> Option<&BlockParamProxy> {
    match value {
        Value::Foreign(obj) => obj.as_any().downcast_ref::<BlockParamProxy>(),
        _ => None,
    }
}

/// Resolves either a materialized [`BlockObject`] or a [`BlockParamProxy`]
/// down to the block it refers to, the common case method dispatch needs
/// (`call`/`yield` don't care which form produced the value).
pub fn resolve_block(value: &Value) -> Option<Rc<BlockObject>> {
    as_block_owned(value).or_else(|| as_block_param_proxy(value).and_then(BlockParamProxy::resolve))
}
