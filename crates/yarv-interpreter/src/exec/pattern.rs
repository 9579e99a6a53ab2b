//! 4.9 Pattern matching.

use std::cmp::Ordering;
use std::rc::Rc;

use yarv_bytecode::{CheckMatchKind, DefinedKind, PrimitiveType};
use yarv_primitives::{RangeValue, Symbol, Value};

use crate::exec::arith::cmp_values;
use crate::exec::vars::current_class;
use crate::frame::Frame;
use crate::objects::{self, ClassObject};
use crate::vm::Vm;
use crate::VmError;

use super::ControlFlow;

pub fn check_match(vm: &Vm, frame: &Rc<Frame>, kind: CheckMatchKind) -> Result<ControlFlow, VmError> {
    let pattern = frame.pop()?;
    let target = frame.pop()?;
    let result = match kind {
        CheckMatchKind::When | CheckMatchKind::Case => case_eq(vm, &target, &pattern),
        CheckMatchKind::Rescue => case_eq(vm, &target, &pattern),
    };
    frame.push(Value::Bool(result));
    Ok(ControlFlow::Next)
}

fn case_eq(_vm: &Vm, target: &Value, pattern: &Value) -> bool {
    if let Some(class) = objects::as_class(pattern) {
        return is_instance_of(target, class);
    }
    if let Value::Range(r) = pattern {
        return range_contains(r, target);
    }
    *target == *pattern
}

fn is_instance_of(v: &Value, class: &ClassObject) -> bool {
    if let Some(inst) = objects::as_instance(v) {
        let mut cur = Some(inst.class.clone());
        while let Some(c) = cur {
            if std::ptr::eq(c.as_ref(), class) {
                return true;
            }
            cur = c.superclass.borrow().clone();
        }
        return false;
    }
    v.class_name() == class.name.borrow().as_str()
}

fn range_contains(r: &RangeValue, v: &Value) -> bool {
    let above_lo = cmp_values(&r.lo, v).map(|o| o != Ordering::Greater).unwrap_or(false);
    let below_hi = match cmp_values(v, &r.hi) {
        Ok(o) if r.exclusive => o == Ordering::Less,
        Ok(o) => o != Ordering::Greater,
        Err(_) => false,
    };
    above_lo && below_hi
}

pub fn check_type(_vm: &Vm, frame: &Rc<Frame>, kind: PrimitiveType) -> Result<ControlFlow, VmError> {
    let v = frame.pop()?;
    let matches = match kind {
        PrimitiveType::Class => objects::as_class(&v).is_some_and(|c| !c.is_module),
        PrimitiveType::Module => objects::as_class(&v).is_some_and(|c| c.is_module),
        PrimitiveType::Float => matches!(v, Value::Float(_)),
        PrimitiveType::String => matches!(v, Value::String(_)),
        PrimitiveType::Regexp => matches!(v, Value::Regexp(_)),
        PrimitiveType::Array => matches!(v, Value::Array(_)),
        PrimitiveType::Hash => matches!(v, Value::Hash(_)),
        PrimitiveType::Nil => v.is_nil(),
        PrimitiveType::True => matches!(v, Value::Bool(true)),
        PrimitiveType::False => matches!(v, Value::Bool(false)),
        PrimitiveType::Symbol => matches!(v, Value::Symbol(_)),
        PrimitiveType::Fixnum => matches!(v, Value::Int(_)),
        PrimitiveType::Struct | PrimitiveType::File | PrimitiveType::Complex | PrimitiveType::Rational | PrimitiveType::Reserved(_) => false,
    };
    frame.push(Value::Bool(matches));
    Ok(ControlFlow::Next)
}

pub fn check_keyword(_vm: &Vm, frame: &Rc<Frame>, bits_idx: u32, kw_idx: u32) -> Result<ControlFlow, VmError> {
    let bits = frame.local_get(bits_idx, 0);
    let supplied = matches!(bits, Value::Int(b) if (b >> kw_idx) & 1 != 0);
    frame.push(Value::Bool(supplied));
    Ok(ControlFlow::Next)
}

pub fn defined(vm: &Vm, frame: &Rc<Frame>, kind: DefinedKind, name: &str, message: &Value) -> Result<ControlFlow, VmError> {
    let probe = frame.pop()?;
    let sym = Symbol::intern(name);
    let success = match kind {
        DefinedKind::Nil
        | DefinedKind::True
        | DefinedKind::False
        | DefinedKind::SelfKw
        | DefinedKind::Asgn
        | DefinedKind::Expr
        | DefinedKind::Ref
        | DefinedKind::Func
        | DefinedKind::ZSuper => true,
        DefinedKind::Ivar => match objects::as_instance(&frame.self_val) {
            Some(inst) => inst.ivars.borrow().contains_key(&sym),
            None => objects::as_class(&frame.self_val).is_some_and(|c| c.ivars.borrow().contains_key(&sym)),
        },
        DefinedKind::Lvar => frame.iseq.resolve_local(&sym).is_some(),
        DefinedKind::Gvar => vm.globals.contains(&sym),
        DefinedKind::Cvar => current_class(vm, frame).and_then(|c| c.cvar_get(&sym)).is_some(),
        DefinedKind::Const => vm.const_get(&Value::Nil, &sym, frame).is_ok(),
        DefinedKind::ConstFrom => vm.resolve_owned_class(&probe).is_some_and(|c| c.constants.borrow().contains_key(&sym)),
        DefinedKind::Method => match objects::as_instance(&probe) {
            Some(inst) => inst.class.resolve_method(&sym).is_some(),
            None => vm.resolve_owned_class(&probe).is_some_and(|c| c.smethods.borrow().contains_key(&sym)),
        },
        DefinedKind::Yield => vm.frame_yield().is_some(),
    };
    frame.push(if success { message.clone() } else { Value::Nil });
    Ok(ControlFlow::Next)
}
