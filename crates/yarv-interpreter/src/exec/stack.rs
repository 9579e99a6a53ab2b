//! 4.2 Stack manipulation.

use std::rc::Rc;

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn pop(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    frame.pop()?;
    Ok(ControlFlow::Next)
}

pub fn dup(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    frame.push(frame.top(0));
    Ok(ControlFlow::Next)
}

pub fn dupn(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let items: Vec<_> = (0..n).rev().map(|d| frame.top(d)).collect();
    for v in items {
        frame.push(v);
    }
    Ok(ControlFlow::Next)
}

pub fn swap(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    let a = frame.top(0);
    let b = frame.top(1);
    frame.set_top(0, b);
    frame.set_top(1, a);
    Ok(ControlFlow::Next)
}

pub fn topn(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    frame.push(frame.top(n));
    Ok(ControlFlow::Next)
}

pub fn setn(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let v = frame.top(0);
    frame.set_top(n, v);
    Ok(ControlFlow::Next)
}

pub fn adjuststack(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    frame.pop_n(n)?;
    Ok(ControlFlow::Next)
}
