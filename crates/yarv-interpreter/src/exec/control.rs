//! 4.8 Control flow.

use std::rc::Rc;

use yarv_bytecode::{Label, ThrowTag};
use yarv_primitives::Value;

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

fn target(label: &Label) -> usize {
    label.position().expect("jump to an unbound label")
}

pub fn jump(_vm: &Vm, _frame: &Rc<Frame>, label: &Label) -> Result<ControlFlow, VmError> {
    Ok(ControlFlow::Jump(target(label)))
}

pub fn branch_if(_vm: &Vm, frame: &Rc<Frame>, label: &Label) -> Result<ControlFlow, VmError> {
    let cond = frame.pop()?;
    if cond.truthy() {
        Ok(ControlFlow::Jump(target(label)))
    } else {
        Ok(ControlFlow::Next)
    }
}

pub fn branch_unless(_vm: &Vm, frame: &Rc<Frame>, label: &Label) -> Result<ControlFlow, VmError> {
    let cond = frame.pop()?;
    if !cond.truthy() {
        Ok(ControlFlow::Jump(target(label)))
    } else {
        Ok(ControlFlow::Next)
    }
}

pub fn branch_nil(_vm: &Vm, frame: &Rc<Frame>, label: &Label) -> Result<ControlFlow, VmError> {
    let cond = frame.pop()?;
    if cond.is_nil() {
        Ok(ControlFlow::Jump(target(label)))
    } else {
        Ok(ControlFlow::Next)
    }
}

pub fn opt_case_dispatch(
    _vm: &Vm,
    frame: &Rc<Frame>,
    table: &[(Value, Label)],
    else_label: &Label,
) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    let label = table.iter().find(|(key, _)| *key == v).map(|(_, l)| l).unwrap_or(else_label);
    Ok(ControlFlow::Jump(target(label)))
}

pub fn leave(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    Ok(ControlFlow::Return(frame.pop()?))
}

pub fn nop(_vm: &Vm, _frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    Ok(ControlFlow::Next)
}

pub fn throw(_vm: &Vm, frame: &Rc<Frame>, tag: ThrowTag) -> Result<ControlFlow, VmError> {
    let value = frame.pop()?;
    Err(VmError::Unwind { tag, value })
}
