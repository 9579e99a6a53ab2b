//! 4.10 Calls and definitions.

use std::cell::RefCell;
use std::rc::Rc;

use yarv_bytecode::{defineclass_flags, Iseq};
use yarv_calldata::CallData;
use yarv_primitives::{Symbol, Value};

use crate::frame::Frame;
use crate::objects::{class_value, BlockObject, ClassObject};
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

fn pop_args(frame: &Rc<Frame>, cd: &CallData) -> Result<(Vec<Value>, Vec<(Symbol, Value)>, Value), VmError> {
    let kwvals = frame.pop_n(cd.kw_count() as u32)?;
    let kwargs = cd.kw_arg.as_ref().map(|names| names.iter().cloned().zip(kwvals).collect()).unwrap_or_default();
    let args = frame.pop_n(cd.argc as u32)?;
    let receiver = frame.pop()?;
    Ok((args, kwargs, receiver))
}

pub fn send(vm: &Vm, frame: &Rc<Frame>, cd: &CallData, block_iseq: &Option<Rc<Iseq>>) -> Result<ControlFlow, VmError> {
    let (args, kwargs, receiver) = pop_args(frame, cd)?;
    let block = block_iseq.as_ref().map(|iseq| Rc::new(BlockObject { iseq: iseq.clone(), captured_frame: frame.clone() }));
    let result = if cd.is_super() {
        vm.invoke_super(frame, receiver, cd.method.clone(), args, kwargs, block)?
    } else {
        vm.invoke(receiver, cd.method.clone(), args, kwargs, block)?
    };
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn opt_send_without_block(vm: &Vm, frame: &Rc<Frame>, cd: &CallData) -> Result<ControlFlow, VmError> {
    send(vm, frame, cd, &None)
}

pub fn invoke_block(vm: &Vm, frame: &Rc<Frame>, cd: &CallData) -> Result<ControlFlow, VmError> {
    let args = frame.pop_n(cd.argc as u32)?;
    let block = vm.frame_yield().ok_or_else(|| VmError::TypeError("no block given (yield)".to_string()))?;
    let result = vm.run_block(&block, args)?;
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn invoke_super(vm: &Vm, frame: &Rc<Frame>, cd: &CallData, block_iseq: &Option<Rc<Iseq>>) -> Result<ControlFlow, VmError> {
    let (args, kwargs, receiver) = pop_args(frame, cd)?;
    let receiver = if matches!(receiver, Value::Nil) { frame.self_val.clone() } else { receiver };
    let block = block_iseq
        .as_ref()
        .map(|iseq| Rc::new(BlockObject { iseq: iseq.clone(), captured_frame: frame.clone() }))
        .or_else(|| if cd.has_block_arg() { vm.frame_yield() } else { None });
    let result = vm.invoke_super(frame, receiver, cd.method.clone(), args, kwargs, block)?;
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn define_class(vm: &Vm, frame: &Rc<Frame>, name: &Symbol, class_iseq: &Rc<Iseq>, flags: u32) -> Result<ControlFlow, VmError> {
    let superclass_val = frame.pop()?;
    let cbase_val = frame.pop()?;

    let type_bits = flags & defineclass_flags::TYPE_MASK;
    let superclass = if flags & defineclass_flags::FLAG_HAS_SUPERCLASS != 0 {
        vm.resolve_owned_class(&superclass_val).ok_or_else(|| VmError::TypeError("superclass must be a Class".to_string()))?
    } else {
        vm.object_class.clone()
    };

    let class_rc = match vm.classes.borrow().get(name).cloned() {
        Some(existing) => existing,
        None => {
            let is_module = type_bits == defineclass_flags::TYPE_MODULE;
            ClassObject::new(name.as_str(), Some(superclass), is_module)
        }
    };
    vm.classes.borrow_mut().insert(name.clone(), class_rc.clone());
    vm.bind_constant(&cbase_val, name, class_value(class_rc.clone()), frame);

    let class_frame = Frame::new(class_iseq.clone(), class_value(class_rc.clone()), None, Some(class_rc));
    let body_result = vm.run_frame(class_frame)?;
    frame.push(body_result);
    Ok(ControlFlow::Next)
}

pub fn define_method(vm: &Vm, frame: &Rc<Frame>, name: &Symbol, iseq: &Rc<Iseq>) -> Result<ControlFlow, VmError> {
    vm.define_method_on_self(frame, name.clone(), iseq.clone());
    Ok(ControlFlow::Next)
}

pub fn define_smethod(vm: &Vm, frame: &Rc<Frame>, name: &Symbol, iseq: &Rc<Iseq>) -> Result<ControlFlow, VmError> {
    let receiver = frame.pop()?;
    vm.define_singleton_method(&receiver, name.clone(), iseq.clone());
    Ok(ControlFlow::Next)
}

pub fn once(vm: &Vm, frame: &Rc<Frame>, iseq: &Rc<Iseq>, cache: &Rc<RefCell<Option<Value>>>) -> Result<ControlFlow, VmError> {
    if let Some(v) = cache.borrow().clone() {
        frame.push(v);
        return Ok(ControlFlow::Next);
    }
    let once_frame = Frame::new(iseq.clone(), frame.self_val.clone(), Some(frame.clone()), frame.cref.clone());
    let v = vm.run_frame(once_frame)?;
    *cache.borrow_mut() = Some(v.clone());
    frame.push(v);
    Ok(ControlFlow::Next)
}
