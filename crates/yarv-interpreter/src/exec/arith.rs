//! 4.4 Arithmetic and comparison specializations.
//!
//! Every `opt_*` here canonicalizes to a `send` of `cd.method` (spec.md
//! §4.11); rather than duplicate per-operator host arithmetic, `call`
//! just forwards to [`Vm::invoke`] the same way the canonical `send`
//! would, so builtin dispatch only has to be implemented once.

use std::cmp::Ordering;
use std::rc::Rc;

use yarv_calldata::CallData;
use yarv_primitives::Value;

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn opt_arith(vm: &Vm, frame: &Rc<Frame>, op: yarv_bytecode::ArithOp, cd: &CallData) -> Result<ControlFlow, VmError> {
    let args = frame.pop_n(op.arity() as u32)?;
    let receiver = frame.pop()?;
    let result = vm.invoke(receiver, cd.method.clone(), args, vec![], None)?;
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn opt_neq(vm: &Vm, frame: &Rc<Frame>, eq_cd: &CallData) -> Result<ControlFlow, VmError> {
    let rhs = frame.pop()?;
    let lhs = frame.pop()?;
    let eq = vm.invoke(lhs, eq_cd.method.clone(), vec![rhs], vec![], None)?;
    frame.push(Value::Bool(!eq.truthy()));
    Ok(ControlFlow::Next)
}

pub fn cmp_values(a: &Value, b: &Value) -> Result<Ordering, VmError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            let xf = as_f64(a)?;
            let yf = as_f64(b)?;
            xf.partial_cmp(&yf).ok_or_else(|| VmError::TypeError("comparison of NaN failed".to_string()))
        }
        (Value::String(x), Value::String(y)) => Ok(x.borrow().cmp(&y.borrow())),
        _ => Err(VmError::TypeError(format!("comparison of {} with {} failed", a.class_name(), b.class_name()))),
    }
}

fn as_f64(v: &Value) -> Result<f64, VmError> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        _ => Err(VmError::TypeError(format!("{} can't be coerced into Float", v.class_name()))),
    }
}

pub fn opt_newarray_max(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let items = frame.pop_n(n)?;
    let max = reduce_extreme(items, Ordering::Greater)?;
    frame.push(max);
    Ok(ControlFlow::Next)
}

pub fn opt_newarray_min(_vm: &Vm, frame: &Rc<Frame>, n: u32) -> Result<ControlFlow, VmError> {
    let items = frame.pop_n(n)?;
    let min = reduce_extreme(items, Ordering::Less)?;
    frame.push(min);
    Ok(ControlFlow::Next)
}

fn reduce_extreme(items: Vec<Value>, want: Ordering) -> Result<Value, VmError> {
    let mut iter = items.into_iter();
    let mut best = iter.next().ok_or_else(|| VmError::ArgumentError("empty array has no max/min".to_string()))?;
    for v in iter {
        if cmp_values(&v, &best)? == want {
            best = v;
        }
    }
    Ok(best)
}

pub fn opt_aref_with(vm: &Vm, frame: &Rc<Frame>, key: &str, cd: &CallData) -> Result<ControlFlow, VmError> {
    let receiver = frame.pop()?;
    let result = vm.invoke(receiver, cd.method.clone(), vec![Value::string(key)], vec![], None)?;
    frame.push(result);
    Ok(ControlFlow::Next)
}

pub fn opt_aset_with(vm: &Vm, frame: &Rc<Frame>, key: &str, cd: &CallData) -> Result<ControlFlow, VmError> {
    let value = frame.pop()?;
    let receiver = frame.pop()?;
    vm.invoke(receiver, cd.method.clone(), vec![Value::string(key), value.clone()], vec![], None)?;
    frame.push(value);
    Ok(ControlFlow::Next)
}

pub fn opt_str_freeze(_vm: &Vm, frame: &Rc<Frame>, value: &str) -> Result<ControlFlow, VmError> {
    frame.push(Value::string(value));
    Ok(ControlFlow::Next)
}

pub fn opt_str_uminus(_vm: &Vm, frame: &Rc<Frame>, value: &str) -> Result<ControlFlow, VmError> {
    frame.push(Value::string(value));
    Ok(ControlFlow::Next)
}
