//! The VM runtime: frame management, method dispatch and the main
//! fetch-execute loop (GLOSSARY: VM, Frame, Call frame stack).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use yarv_bytecode::{Iseq, ThrowTag};
use yarv_primitives::{Symbol, Value};

use crate::exec::{ControlFlow, Execute};
use crate::frame::Frame;
use crate::globals::GlobalTable;
use crate::objects::{self, class_value, BlockObject, ClassObject, MethodObject};
use crate::VmError;

/// Runtime limits that have no bearing on observable semantics but keep a
/// runaway program from exhausting the host stack (top-level spec's
/// resource model names cancellation/timeouts as explicitly out of scope
/// at the opcode layer, but an unbounded native recursion is a crash, not
/// a VM behavior, so it gets a config knob instead).
#[derive(Debug, Clone)]
pub struct VmConfig {
    pub max_call_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig { max_call_depth: 4096 }
    }
}

/// Process-wide interpreter state: globals, the constant/class namespace,
/// and the dynamic call stack. One `Vm` corresponds to one program run.
pub struct Vm {
    pub globals: GlobalTable,
    pub object_class: Rc<ClassObject>,
    /// Every class/module ever defined, keyed by name, so that a
    /// `Value::Foreign(Rc<ClassObject>)` looked up by name can hand back
    /// an *owned* `Rc` (downcasting the trait object only ever yields a
    /// borrow — see `objects::as_class`).
    pub classes: RefCell<HashMap<Symbol, Rc<ClassObject>>>,
    /// Top-level constants that aren't classes/modules.
    pub constants: RefCell<HashMap<Symbol, Value>>,
    pub main_ivars: RefCell<HashMap<Symbol, Value>>,
    pub config: VmConfig,
    call_stack: RefCell<Vec<Rc<Frame>>>,
}

impl Vm {
    pub fn new() -> Rc<Self> {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Rc<Self> {
        let object_class = ClassObject::new("Object", None, false);
        let mut classes = HashMap::new();
        classes.insert(Symbol::intern("Object"), object_class.clone());
        Rc::new(Vm {
            globals: GlobalTable::new(),
            object_class,
            classes: RefCell::new(classes),
            constants: RefCell::new(HashMap::new()),
            main_ivars: RefCell::new(HashMap::new()),
            config,
            call_stack: RefCell::new(Vec::new()),
        })
    }

    /// The frame currently executing. Panics outside of `run_frame` —
    /// every `Execute` impl is only ever called from within the dispatch
    /// loop, which always has one pushed.
    pub fn frame(&self) -> Rc<Frame> {
        self.call_stack.borrow().last().cloned().expect("no active frame")
    }

    /// The nearest frame on the dynamic call stack (not the lexical
    /// chain) carrying a block, for `invokeblock`/`getblockparam` at
    /// `level == 0`'s method-local notion of "the block passed to me".
    pub fn frame_yield(&self) -> Option<Rc<BlockObject>> {
        self.call_stack
            .borrow()
            .iter()
            .rev()
            .find_map(|f| f.block.borrow().clone())
    }

    pub fn resolve_owned_class(&self, value: &Value) -> Option<Rc<ClassObject>> {
        objects::as_class_owned(value)
    }

    fn method_owner_for(&self, self_val: &Value) -> Rc<ClassObject> {
        if let Some(c) = self.resolve_owned_class(self_val) {
            return c;
        }
        if let Some(inst) = objects::as_instance(self_val) {
            return inst.class.clone();
        }
        self.object_class.clone()
    }

    /// Constant lookup: the receiver class's own table and ancestry if
    /// `cbase` names a class, otherwise the lexical nesting of `frame`
    /// from innermost outward, finally the top-level namespace.
    pub fn const_get(&self, cbase: &Value, name: &Symbol, frame: &Rc<Frame>) -> Result<Value, VmError> {
        if let Some(class) = objects::as_class(cbase) {
            if let Some(v) = class.constants.borrow().get(name) {
                return Ok(v.clone());
            }
            if let Some(sup) = class.superclass.borrow().clone() {
                return self.const_get(&class_value(sup), name, frame);
            }
        }
        let mut f = Some(frame.clone());
        while let Some(fr) = f {
            if let Some(cref) = &fr.cref {
                if let Some(v) = cref.constants.borrow().get(name) {
                    return Ok(v.clone());
                }
            }
            f = fr.lexical_parent.clone();
        }
        if let Some(v) = self.constants.borrow().get(name) {
            return Ok(v.clone());
        }
        if let Some(c) = self.classes.borrow().get(name) {
            return Ok(class_value(c.clone()));
        }
        Err(VmError::NameNotFound { kind: "constant", name: name.as_str().to_string() })
    }

    /// Binds `name` to `value` on `cbase` if it names a class, otherwise
    /// on the current lexical `cref`, otherwise at the top level.
    pub fn bind_constant(&self, cbase: &Value, name: &Symbol, value: Value, frame: &Rc<Frame>) {
        if let Some(class) = self.resolve_owned_class(cbase) {
            class.constants.borrow_mut().insert(name.clone(), value);
            return;
        }
        if let Some(cref) = &frame.cref {
            cref.constants.borrow_mut().insert(name.clone(), value.clone());
        }
        if objects::as_class(&value).is_some() {
            if let Some(owned) = self.resolve_owned_class(&value) {
                self.classes.borrow_mut().insert(name.clone(), owned);
                return;
            }
        }
        self.constants.borrow_mut().insert(name.clone(), value);
    }

    /// Dispatches a method call: user-defined methods first (singleton
    /// methods when the receiver is a class), then the built-in core-type
    /// operators.
    pub fn invoke(
        &self,
        receiver: Value,
        method: Symbol,
        args: Vec<Value>,
        kwargs: Vec<(Symbol, Value)>,
        block: Option<Rc<BlockObject>>,
    ) -> Result<Value, VmError> {
        if let Some(class) = objects::as_class(&receiver) {
            if let Some(m) = class.smethods.borrow().get(&method).cloned() {
                return self.call_method(receiver.clone(), self.method_owner_for(&receiver), m, args, kwargs, block);
            }
        }
        if let Some(inst) = objects::as_instance(&receiver) {
            if let Some(m) = inst.class.resolve_method(&method) {
                let owner = inst.class.clone();
                return self.call_method(receiver.clone(), owner, m, args, kwargs, block);
            }
        }
        if let Some(v) = crate::builtin::dispatch(self, &receiver, &method, &args, block.clone())? {
            return Ok(v);
        }
        Err(VmError::MethodMissing { receiver_class: receiver.class_name(), method: method.as_str().to_string() })
    }

    /// `invokesuper`: resolves from the superclass of the class that
    /// defined the method currently executing in `frame`, regardless of
    /// the receiver's actual (possibly more derived) class.
    pub fn invoke_super(
        &self,
        frame: &Rc<Frame>,
        receiver: Value,
        method: Symbol,
        args: Vec<Value>,
        kwargs: Vec<(Symbol, Value)>,
        block: Option<Rc<BlockObject>>,
    ) -> Result<Value, VmError> {
        let defining_class = frame.cref.clone().unwrap_or_else(|| self.method_owner_for(&frame.self_val));
        let actual_class = self.method_owner_for(&receiver);
        let m = actual_class
            .resolve_super(&defining_class, &method)
            .ok_or_else(|| VmError::MethodMissing { receiver_class: receiver.class_name(), method: method.as_str().to_string() })?;
        self.call_method(receiver, actual_class, m, args, kwargs, block)
    }

    fn call_method(
        &self,
        receiver: Value,
        owner: Rc<ClassObject>,
        method: Rc<MethodObject>,
        args: Vec<Value>,
        kwargs: Vec<(Symbol, Value)>,
        block: Option<Rc<BlockObject>>,
    ) -> Result<Value, VmError> {
        let frame = Frame::new(method.iseq.clone(), receiver, None, Some(owner));
        bind_params(&frame, &args, &kwargs);
        *frame.block.borrow_mut() = block;
        self.run_frame(frame)
    }

    pub fn run_method(&self, iseq: Rc<Iseq>, self_val: Value, cref: Option<Rc<ClassObject>>) -> Result<Value, VmError> {
        let frame = Frame::new(iseq, self_val, None, cref);
        self.run_frame(frame)
    }

    pub fn run_block(&self, block: &BlockObject, args: Vec<Value>) -> Result<Value, VmError> {
        let frame = Frame::new(
            block.iseq.clone(),
            block.captured_frame.self_val.clone(),
            Some(block.captured_frame.clone()),
            block.captured_frame.cref.clone(),
        );
        bind_params(&frame, &args, &[]);
        self.run_frame(frame)
    }

    pub fn define_method_on_self(&self, frame: &Rc<Frame>, name: Symbol, iseq: Rc<Iseq>) {
        let owner = self.method_owner_for(&frame.self_val);
        let m = MethodObject::new(name.clone(), iseq);
        *m.owner.borrow_mut() = Some(owner.clone());
        owner.methods.borrow_mut().insert(name, m);
    }

    pub fn define_singleton_method(&self, receiver: &Value, name: Symbol, iseq: Rc<Iseq>) {
        let owner = self.method_owner_for(receiver);
        let m = MethodObject::new(name.clone(), iseq);
        *m.owner.borrow_mut() = Some(owner.clone());
        owner.smethods.borrow_mut().insert(name, m);
    }

    /// The main fetch-execute loop for one frame: runs until `leave`
    /// produces a return value or an unhandled error escapes.
    pub fn run_frame(&self, frame: Rc<Frame>) -> Result<Value, VmError> {
        if self.call_stack.borrow().len() >= self.config.max_call_depth {
            return Err(VmError::TypeError("stack level too deep".to_string()));
        }
        self.call_stack.borrow_mut().push(frame.clone());
        let result = self.dispatch_loop(&frame);
        self.call_stack.borrow_mut().pop();
        result
    }

    fn dispatch_loop(&self, frame: &Rc<Frame>) -> Result<Value, VmError> {
        loop {
            let pc = frame.pc.get();
            let insn = frame.iseq.insns.get(pc).cloned().expect("pc ran off the end of the iseq without a leave");
            frame.pc.set(pc + 1);
            match insn.exec(self, frame) {
                Ok(ControlFlow::Next) => continue,
                Ok(ControlFlow::Jump(target)) => {
                    frame.pc.set(target);
                    continue;
                }
                Ok(ControlFlow::Return(v)) => return Ok(v),
                Err(err) => match self.handle_unwind(frame, pc, err) {
                    Ok(()) => continue,
                    Err(escaped) => return Err(escaped),
                },
            }
        }
    }

    /// On a `throw`, looks for a catch-table entry covering `pc` for the
    /// unwind's tag. A `rescue`/`ensure` entry runs its handler iseq as a
    /// nested frame first, then the thrown value (or the handler's return
    /// value, if it ran) is pushed and control resumes at the entry's
    /// target. A plain `break`/`next`/`retry`/`redo` entry just jumps.
    fn handle_unwind(&self, frame: &Rc<Frame>, pc: usize, err: VmError) -> Result<(), VmError> {
        let VmError::Unwind { tag, value } = err else {
            return Err(err);
        };
        let Some(entry) = frame.iseq.catch_entry_for(pc, tag) else {
            return Err(VmError::Unwind { tag, value });
        };
        let resumed = if let Some(handler_iseq) = &entry.iseq {
            let handler_frame = Frame::new(handler_iseq.clone(), frame.self_val.clone(), Some(frame.clone()), frame.cref.clone());
            handler_frame.push(value);
            self.run_frame(handler_frame)?
        } else {
            value
        };
        frame.push(resumed);
        frame.pc.set(entry.target.position().expect("unbound catch target"));
        Ok(())
    }
}

fn bind_params(frame: &Rc<Frame>, args: &[Value], kwargs: &[(Symbol, Value)]) {
    let mut locals = frame.locals.borrow_mut();
    for (i, v) in args.iter().enumerate() {
        if i < locals.len() {
            locals[i] = v.clone();
        }
    }
    for (name, v) in kwargs {
        if let Some(idx) = frame.iseq.local_table.index_of(name) {
            let storage = frame.iseq.local_table.offset(idx) as usize;
            if storage < locals.len() {
                locals[storage] = v.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yarv_bytecode::{Insn, IseqType, LocalTable};

    #[test]
    fn running_a_bare_leave_returns_the_popped_value() {
        let vm = Vm::new();
        let mut iseq = Iseq::new("<main>", IseqType::Main, LocalTable::default());
        iseq.insns.push(Insn::PutObject { value: Value::Int(7) });
        iseq.insns.push(Insn::Leave);
        let result = vm.run_method(Rc::new(iseq), Value::Nil, None).unwrap();
        assert_eq!(result, Value::Int(7));
    }

    #[test]
    fn unhandled_throw_escapes_as_an_unwind_error() {
        let vm = Vm::new();
        let mut iseq = Iseq::new("<main>", IseqType::Main, LocalTable::default());
        iseq.insns.push(Insn::PutObject { value: Value::Int(1) });
        iseq.insns.push(Insn::Throw { tag: ThrowTag::Raise });
        let err = vm.run_method(Rc::new(iseq), Value::Nil, None).unwrap_err();
        assert!(err.is_unwind());
    }
}
