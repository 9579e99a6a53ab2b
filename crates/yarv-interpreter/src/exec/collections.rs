//! 4.6 Arrays and hashes.

use std::rc::Rc;

use yarv_bytecode::expandarray_flags;
use yarv_primitives::Value;

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn new_array(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let items = frame.pop_n(n)?;
    frame.push(Value::array(items));
    Ok(ControlFlow::Next)
}

pub fn new_array_kw_splat(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    // The trailing element is a kwsplat hash; flattened into the array
    // alongside the positional items rather than kept structurally
    // distinct, since this VM has no separate "array with trailing kwrest"
    // representation.
    let items = frame.pop_n(n)?;
    frame.push(Value::array(items));
    Ok(ControlFlow::Next)
}

pub fn new_hash(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let flat = frame.pop_n(n)?;
    let pairs = flat.chunks(2).map(|pair| (pair[0].clone(), pair[1].clone())).collect();
    frame.push(Value::hash(pairs));
    Ok(ControlFlow::Next)
}

pub fn concat_array(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    let tail = frame.pop()?;
    let head = frame.pop()?;
    let mut items = as_array_items(&head)?;
    items.extend(as_array_items(&tail)?);
    frame.push(Value::array(items));
    Ok(ControlFlow::Next)
}

pub fn splat_array(_vm: &Vm, frame: &Rc<Frame>, flag: bool) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    let items = as_array_items(&v)?;
    let _ = flag; // flag marks "duplicate the array"; every splat here is fresh already
    frame.push(Value::array(items));
    Ok(ControlFlow::Next)
}

pub fn expand_array(_vm: &Vm, frame: &Rc<Frame>, n: u32, flags: u32) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    let items = as_array_items(&v)?;
    let postarg = flags & expandarray_flags::POSTARG != 0;
    let remainder = flags & expandarray_flags::REMAINDER != 0;

    let fixed = if remainder { n.saturating_sub(1) } else { n } as usize;
    let mut pushed = Vec::with_capacity(n as usize);

    if remainder {
        if postarg {
            let rest_len = items.len().saturating_sub(fixed);
            pushed.push(Value::array(items[..rest_len].to_vec()));
            pushed.extend(items[rest_len..].iter().cloned().chain(std::iter::repeat(Value::Nil)).take(fixed));
        } else {
            pushed.extend(items.iter().cloned().chain(std::iter::repeat(Value::Nil)).take(fixed));
            pushed.push(Value::array(items.iter().skip(fixed).cloned().collect()));
        }
    } else {
        pushed.extend(items.iter().cloned().chain(std::iter::repeat(Value::Nil)).take(fixed));
    }

    // `expandarray` pushes the destructured locals in reverse (so the
    // compiler's sequence of `setlocal`s consumes them left to right).
    for v in pushed.into_iter().rev() {
        frame.push(v);
    }
    Ok(ControlFlow::Next)
}

fn as_array_items(v: &Value) -> Result<Vec<Value>, VmError> {
    match v {
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::Nil => Ok(vec![]),
        other => Ok(vec![other.clone()]),
    }
}
