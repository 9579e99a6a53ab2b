//! 4.5 Strings and ranges.

use std::rc::Rc;

use yarv_calldata::CallData;
use yarv_primitives::{RangeValue, RegexpValue, Value};

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn concat_strings(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let parts = frame.pop_n(n)?;
    let joined: String = parts.iter().map(Value::to_s).collect();
    frame.push(Value::string(joined));
    Ok(ControlFlow::Next)
}

/// Pops `(original, coerced)` (`coerced` on top, pushed by the preceding
/// `objtostring`). If `coerced` is already a string, pushes it verbatim;
/// otherwise a user-defined `to_s` returned something non-string, so this
/// falls back to a string representation of `original` instead.
pub fn any_to_string(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    let coerced = frame.pop()?;
    let original = frame.pop()?;
    let result = match coerced {
        Value::String(_) => coerced,
        _ => Value::string(original.to_s()),
    };
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn obj_to_string(vm: &Vm, frame: &Rc<Frame>, cd: &CallData) -> Result<ControlFlow, VmError> {
    let obj = frame.pop()?;
    let result = match obj {
        Value::String(_) => obj,
        other => vm.invoke(other, cd.method.clone(), vec![], vec![], None)?,
    };
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn intern(_vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    frame.push(Value::symbol(&v.to_s()));
    Ok(ControlFlow::Next)
}

pub fn to_regexp(_vm: &Vm, frame: &Rc<Frame>, opts: u32, n: u32) -> Result<ControlFlow, VmError> {
    let parts = frame.pop_n(n)?;
    let source: String = parts.iter().map(Value::to_s).collect();
    frame.push(Value::Regexp(Rc::new(RegexpValue { source, options: opts })));
    Ok(ControlFlow::Next)
}

pub fn new_range(_vm: &Vm, frame: &Rc<Frame>, exclusive: bool) -> Result<ControlFlow, VmError> {
    let hi = frame.pop()?;
    let lo = frame.pop()?;
    frame.push(Value::Range(Rc::new(RangeValue { lo, hi, exclusive })));
    Ok(ControlFlow::Next)
}
