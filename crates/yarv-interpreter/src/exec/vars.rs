//! 4.7 Variables.

use std::rc::Rc;

use yarv_bytecode::{InlineCache, SpecialVarKind};
use yarv_primitives::{Symbol, Value};

use crate::frame::Frame;
use crate::objects::{self, class_value};
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn getlocal(_vm: &Vm, frame: &Rc<Frame>, idx: u32, level: u32) -> Result<ControlFlow, VmError> {
    frame.push(frame.local_get(idx, level));
    Ok(ControlFlow::Next)
}

pub fn setlocal(_vm: &Vm, frame: &Rc<Frame>, idx: u32, level: u32) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    frame.local_set(idx, level, v);
    Ok(ControlFlow::Next)
}

pub fn get_block_param(vm: &Vm, frame: &Rc<Frame>, idx: u32, level: u32) -> Result<ControlFlow, VmError> {
    let _ = (vm, idx);
    let v = frame
        .block_get(level)
        .map(|b| Value::Foreign(b as Rc<dyn yarv_primitives::ForeignObject>))
        .unwrap_or(Value::Nil);
    frame.push(v);
    Ok(ControlFlow::Next)
}

/// Unlike [`get_block_param`], this never resolves the block eagerly: it
/// pushes a [`crate::objects::BlockParamProxy`] that remembers the frame
/// and level and only looks the block up when something actually invokes
/// it (`call`/`yield`), the way a lexical `&blk` parameter read for
/// forwarding shouldn't force materializing a full `Proc` just to pass it
/// along.
pub fn get_block_param_proxy(vm: &Vm, frame: &Rc<Frame>, idx: u32, level: u32) -> Result<ControlFlow, VmError> {
    let _ = (vm, idx);
    frame.push(Value::Foreign(objects::BlockParamProxy::new(frame.clone(), level)));
    Ok(ControlFlow::Next)
}

pub fn set_block_param(_vm: &Vm, frame: &Rc<Frame>, idx: u32, level: u32) -> Result<ControlFlow, VmError> {
    let _ = idx;
    let v = frame.pop()?;
    frame.block_set(level, objects::as_block_owned(&v));
    Ok(ControlFlow::Next)
}

pub fn get_instance_variable(_vm: &Vm, frame: &Rc<Frame>, name: &Symbol, _cache: &InlineCache) -> Result<ControlFlow, VmError> {
    let v = ivars_get(frame, name);
    frame.push(v);
    Ok(ControlFlow::Next)
}

pub fn set_instance_variable(_vm: &Vm, frame: &Rc<Frame>, name: &Symbol, _cache: &InlineCache) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    ivars_set(frame, name, v);
    Ok(ControlFlow::Next)
}

fn ivars_get(frame: &Rc<Frame>, name: &Symbol) -> Value {
    if let Some(inst) = objects::as_instance(&frame.self_val) {
        return inst.ivars.borrow().get(name).cloned().unwrap_or(Value::Nil);
    }
    if let Some(class) = objects::as_class(&frame.self_val) {
        return class.ivars.borrow().get(name).cloned().unwrap_or(Value::Nil);
    }
    Value::Nil
}

fn ivars_set(frame: &Rc<Frame>, name: &Symbol, v: Value) {
    if let Some(inst) = objects::as_instance(&frame.self_val) {
        inst.ivars.borrow_mut().insert(name.clone(), v);
        return;
    }
    if let Some(class) = objects::as_class(&frame.self_val) {
        class.ivars.borrow_mut().insert(name.clone(), v);
    }
}

pub fn get_class_variable(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    let class = current_class(vm, frame);
    let v = class.and_then(|c| c.cvar_get(name)).unwrap_or(Value::Nil);
    frame.push(v);
    Ok(ControlFlow::Next)
}

pub fn set_class_variable(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    if let Some(class) = current_class(vm, frame) {
        class.cvar_set(name, v);
    }
    Ok(ControlFlow::Next)
}

pub(crate) fn current_class(vm: &Vm, frame: &Rc<Frame>) -> Option<Rc<crate::objects::ClassObject>> {
    if let Some(c) = frame.cref.clone() {
        return Some(c);
    }
    vm.resolve_owned_class(&frame.self_val).or_else(|| objects::as_instance(&frame.self_val).map(|i| i.class.clone()))
}

pub fn get_global(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    frame.push(vm.globals.get(name));
    Ok(ControlFlow::Next)
}

pub fn set_global(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    vm.globals.set(name.clone(), v);
    Ok(ControlFlow::Next)
}

pub fn get_constant(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    let _allow_missing = frame.pop()?;
    let cbase = frame.pop()?;
    let v = vm.const_get(&cbase, name, frame)?;
    frame.push(v);
    Ok(ControlFlow::Next)
}

pub fn set_constant(vm: &Vm, frame: &Rc<Frame>, name: &Symbol) -> Result<ControlFlow, VmError> {
    let cbase = frame.pop()?;
    let value = frame.pop()?;
    vm.bind_constant(&cbase, name, value, frame);
    Ok(ControlFlow::Next)
}

pub fn opt_get_constant_path(vm: &Vm, frame: &Rc<Frame>, names: &[Symbol]) -> Result<ControlFlow, VmError> {
    let mut cbase = class_value(vm.object_class.clone());
    let mut value = cbase.clone();
    for name in names {
        value = vm.const_get(&cbase, name, frame)?;
        cbase = value.clone();
    }
    frame.push(value);
    Ok(ControlFlow::Next)
}

pub fn get_special(_vm: &Vm, frame: &Rc<Frame>, key: u32, kind: SpecialVarKind) -> Result<ControlFlow, VmError> {
    let svar = frame.svar.borrow();
    let v = match kind {
        SpecialVarKind::LastLine => svar.last_line.clone(),
        SpecialVarKind::Backref => svar.backref.clone(),
        SpecialVarKind::FlipFlop => svar.flip_flops.get(key as usize).map(|b| Value::Bool(*b)).unwrap_or(Value::Bool(false)),
    };
    drop(svar);
    frame.push(v);
    Ok(ControlFlow::Next)
}

pub fn set_special(_vm: &Vm, frame: &Rc<Frame>, key: u32) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    let mut svar = frame.svar.borrow_mut();
    match SpecialVarKind::from_key(key) {
        SpecialVarKind::LastLine => svar.last_line = v,
        SpecialVarKind::Backref => svar.backref = v,
        SpecialVarKind::FlipFlop => {
            let idx = key as usize;
            if svar.flip_flops.len() <= idx {
                svar.flip_flops.resize(idx + 1, false);
            }
            svar.flip_flops[idx] = v.truthy();
        }
    }
    Ok(ControlFlow::Next)
}
