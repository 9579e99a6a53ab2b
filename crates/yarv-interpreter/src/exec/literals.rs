//! 4.3 Constants and literals.

use std::rc::Rc;

use yarv_bytecode::SpecialObjectKind;
use yarv_primitives::Value;

use crate::frame::Frame;
use crate::objects::class_value;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn putnil(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    frame.push(Value::Nil);
    Ok(ControlFlow::Next)
}

pub fn putself(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    frame.push(frame.self_val.clone());
    Ok(ControlFlow::Next)
}

pub fn putobject(_vm: &Vm, frame: &Rc<Frame>, value: &Value) -> Result<ControlFlow, VmError> {
    frame.push(value.clone());
    Ok(ControlFlow::Next)
}

pub fn putobject_int2fix(_vm: &Vm, frame: &Rc<Frame>, n: i64) -> Result<ControlFlow, VmError> {
    frame.push(Value::Int(n));
    Ok(ControlFlow::Next)
}

pub fn putstring(_vm: &Vm, frame: &Rc<Frame>, value: &str) -> Result<ControlFlow, VmError> {
    frame.push(Value::string(value));
    Ok(ControlFlow::Next)
}

pub fn dup_array(_vm: &Vm, frame: &Rc<Frame>, value: &[Value]) -> Result<ControlFlow, VmError> {
    frame.push(Value::array(value.to_vec()));
    Ok(ControlFlow::Next)
}

pub fn dup_hash(_vm: &Vm, frame: &Rc<Frame>, value: &[(Value, Value)]) -> Result<ControlFlow, VmError> {
    frame.push(Value::hash(value.to_vec()));
    Ok(ControlFlow::Next)
}

pub fn put_special_object(vm: &Vm, frame: &Rc<Frame>, kind: SpecialObjectKind) -> Result<ControlFlow, VmError> {
    let v = match kind {
        SpecialObjectKind::VmCore => Value::Nil,
        SpecialObjectKind::CBase | SpecialObjectKind::ConstBase => match &frame.cref {
            Some(c) => class_value(c.clone()),
            None => class_value(vm.object_class.clone()),
        },
    };
    frame.push(v);
    Ok(ControlFlow::Next)
}
