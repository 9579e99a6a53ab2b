//! Core-type method dispatch: the fallback [`crate::vm::Vm::invoke`] reaches
//! for once user-defined method resolution comes up empty. Mirrors the
//! teacher repo's per-opcode free-function style (one function per
//! receiver kind, matched on the method name) rather than building a
//! vtable, since the operator set is small and fixed.

use std::cell::RefCell;
use std::rc::Rc;

use yarv_primitives::{RangeValue, Symbol, Value};

use crate::objects::{self, class_value, BlockObject, InstanceObject};
use crate::vm::Vm;
use crate::VmError;

pub fn dispatch(
    vm: &Vm,
    receiver: &Value,
    method: &Symbol,
    args: &[Value],
    block: Option<Rc<BlockObject>>,
) -> Result<Option<Value>, VmError> {
    let name = method.as_str();

    if let Some(class) = objects::as_class(receiver) {
        if let Some(v) = class_ops(vm, receiver, class, name, args)? {
            return Ok(Some(v));
        }
    }

    if let Some(block) = objects::resolve_block(receiver) {
        if let Some(v) = block_ops(vm, &block, name, args)? {
            return Ok(Some(v));
        }
    }

    Ok(match receiver {
        Value::Int(a) => int_ops(*a, name, args)?,
        Value::Float(a) => float_ops(*a, name, args)?,
        Value::String(s) => string_ops(s, name, args)?,
        Value::Array(a) => array_ops(a, name, args, vm, &block)?,
        Value::Hash(h) => hash_ops(h, name, args)?,
        Value::Symbol(s) => symbol_ops(s, name)?,
        Value::Bool(b) => bool_ops(*b, name)?,
        Value::Nil => nil_ops(name)?,
        Value::Range(r) => range_ops(r, name, args, vm, &block)?,
        _ => None,
    }
    .or_else(|| universal_ops(receiver, name)))
}

fn universal_ops(receiver: &Value, name: &str) -> Option<Value> {
    match name {
        "to_s" => Some(Value::string(receiver.to_s())),
        "inspect" => Some(Value::string(receiver.inspect())),
        "class" => None, // classes aren't reified per primitive kind without a registry lookup; left to Vm if ever needed
        "nil?" => Some(Value::Bool(receiver.is_nil())),
        "==" | "eql?" => None,
        _ => None,
    }
}

/// `call`/`yield`/`[]` on a block or proc value, including one reached
/// through a [`crate::objects::BlockParamProxy`] — invocation is the one
/// thing the proxy's thin wrapper promises to still support.
fn block_ops(vm: &Vm, block: &Rc<BlockObject>, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    Ok(match name {
        "call" | "()" | "yield" | "[]" => Some(vm.run_block(block, args.to_vec())?),
        "to_proc" => Some(Value::Foreign(block.clone())),
        _ => None,
    })
}

fn class_ops(vm: &Vm, receiver: &Value, class: &crate::objects::ClassObject, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    match name {
        "new" => {
            let owned = vm.resolve_owned_class(receiver).expect("receiver just matched as_class");
            let instance = InstanceObject::new(owned);
            let value = Value::Foreign(instance);
            if let Some(initialize) = class.resolve_method(&Symbol::intern("initialize")) {
                let _ = vm.invoke(value.clone(), initialize.name.clone(), args.to_vec(), vec![], None)?;
            }
            Ok(Some(value))
        }
        "name" | "to_s" | "inspect" => Ok(Some(Value::string(class.name.borrow().clone()))),
        "superclass" => Ok(Some(class.superclass.borrow().clone().map(class_value).unwrap_or(Value::Nil))),
        "instance_methods" => {
            let names = class.methods.borrow().keys().map(|s| Value::symbol(s.as_str())).collect();
            Ok(Some(Value::array(names)))
        }
        _ => Ok(None),
    }
}

fn int_ops(a: i64, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    let b = || numeric_arg(args, 0);
    Ok(Some(match name {
        "+" => add(Value::Int(a), args.first().cloned().unwrap_or(Value::Nil))?,
        "-" => match b()? {
            Num::Int(x) => Value::Int(a - x),
            Num::Float(x) => Value::Float(a as f64 - x),
        },
        "*" => match b()? {
            Num::Int(x) => Value::Int(a * x),
            Num::Float(x) => Value::Float(a as f64 * x),
        },
        "/" => match b()? {
            Num::Int(0) => return Err(VmError::DivisionByZero),
            Num::Int(x) => Value::Int(a.div_euclid(x)),
            Num::Float(x) => Value::Float(a as f64 / x),
        },
        "%" => match b()? {
            Num::Int(0) => return Err(VmError::DivisionByZero),
            Num::Int(x) => Value::Int(a.rem_euclid(x)),
            Num::Float(x) => Value::Float((a as f64).rem_euclid(x)),
        },
        "&" => Value::Int(a & int_arg(args, 0)?),
        "|" => Value::Int(a | int_arg(args, 0)?),
        "<<" => Value::Int(a << int_arg(args, 0)?),
        "<" => Value::Bool((a as f64) < numeric_f64(b()?)),
        "<=" => Value::Bool((a as f64) <= numeric_f64(b()?)),
        ">" => Value::Bool((a as f64) > numeric_f64(b()?)),
        ">=" => Value::Bool((a as f64) >= numeric_f64(b()?)),
        "==" => Value::Bool(Value::Int(a) == args.first().cloned().unwrap_or(Value::Nil)),
        "succ" | "next" => Value::Int(a + 1),
        "!" => Value::Bool(false),
        "nil?" => Value::Bool(false),
        "empty?" => return Ok(None),
        "to_i" => Value::Int(a),
        "to_f" => Value::Float(a as f64),
        "to_s" => Value::string(a.to_string()),
        "abs" => Value::Int(a.abs()),
        "even?" => Value::Bool(a % 2 == 0),
        "odd?" => Value::Bool(a % 2 != 0),
        "zero?" => Value::Bool(a == 0),
        _ => return Ok(None),
    }))
}

enum Num {
    Int(i64),
    Float(f64),
}

fn numeric_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn numeric_arg(args: &[Value], idx: usize) -> Result<Num, VmError> {
    match args.get(idx) {
        Some(Value::Int(i)) => Ok(Num::Int(*i)),
        Some(Value::Float(f)) => Ok(Num::Float(*f)),
        other => Err(VmError::TypeError(format!("expected a number, got {}", other.map(Value::class_name).unwrap_or("nothing")))),
    }
}

fn int_arg(args: &[Value], idx: usize) -> Result<i64, VmError> {
    match args.get(idx) {
        Some(Value::Int(i)) => Ok(*i),
        other => Err(VmError::TypeError(format!("expected an Integer, got {}", other.map(Value::class_name).unwrap_or("nothing")))),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value, VmError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => Ok(Value::Float(a as f64 + b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::String(a), b @ Value::String(_)) => Ok(Value::string(format!("{}{}", a.borrow(), b.to_s()))),
        (Value::Array(a), Value::Array(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::array(items))
        }
        (a, b) => Err(VmError::TypeError(format!("no implicit conversion to add {} and {}", a.class_name(), b.class_name()))),
    }
}

fn float_ops(a: f64, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    let b = || numeric_f64(numeric_arg(args, 0).unwrap_or(Num::Float(f64::NAN)));
    Ok(Some(match name {
        "+" => add(Value::Float(a), args.first().cloned().unwrap_or(Value::Nil))?,
        "-" => Value::Float(a - b()),
        "*" => Value::Float(a * b()),
        "/" => Value::Float(a / b()),
        "%" => Value::Float(a.rem_euclid(b())),
        "<" => Value::Bool(a < b()),
        "<=" => Value::Bool(a <= b()),
        ">" => Value::Bool(a > b()),
        ">=" => Value::Bool(a >= b()),
        "==" => Value::Bool(Value::Float(a) == args.first().cloned().unwrap_or(Value::Nil)),
        "to_i" => Value::Int(a as i64),
        "to_f" => Value::Float(a),
        "to_s" => Value::string(Value::Float(a).to_s()),
        "abs" => Value::Float(a.abs()),
        "nil?" => Value::Bool(false),
        "zero?" => Value::Bool(a == 0.0),
        _ => return Ok(None),
    }))
}

fn string_ops(s: &Rc<RefCell<String>>, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "+" => add(Value::String(s.clone()), args.first().cloned().unwrap_or(Value::Nil))?,
        "length" | "size" => Value::Int(s.borrow().chars().count() as i64),
        "empty?" => Value::Bool(s.borrow().is_empty()),
        "nil?" => Value::Bool(false),
        "to_s" => Value::String(s.clone()),
        "to_sym" => Value::symbol(&s.borrow()),
        "to_i" => Value::Int(s.borrow().trim().parse().unwrap_or(0)),
        "upcase" => Value::string(s.borrow().to_uppercase()),
        "downcase" => Value::string(s.borrow().to_lowercase()),
        "reverse" => Value::string(s.borrow().chars().rev().collect::<String>()),
        "==" => Value::Bool(Value::String(s.clone()) == args.first().cloned().unwrap_or(Value::Nil)),
        "[]" => match args.first() {
            Some(Value::Int(i)) => s
                .borrow()
                .chars()
                .nth(index_from(*i, s.borrow().chars().count()))
                .map(|c| Value::string(c.to_string()))
                .unwrap_or(Value::Nil),
            Some(Value::String(key)) => {
                if s.borrow().contains(&*key.borrow()) {
                    Value::string(key.borrow().clone())
                } else {
                    Value::Nil
                }
            }
            _ => Value::Nil,
        },
        "<<" | "concat" => {
            s.borrow_mut().push_str(&args.first().map(Value::to_s).unwrap_or_default());
            Value::String(s.clone())
        }
        "=~" => Value::Nil, // regex matching is out of scope; never matches
        _ => return Ok(None),
    }))
}

fn index_from(i: i64, len: usize) -> usize {
    if i < 0 {
        (len as i64 + i).max(0) as usize
    } else {
        i as usize
    }
}

fn array_ops(a: &Rc<RefCell<Vec<Value>>>, name: &str, args: &[Value], vm: &Vm, block: &Option<Rc<BlockObject>>) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "+" => add(Value::Array(a.clone()), args.first().cloned().unwrap_or(Value::Nil))?,
        "length" | "size" | "count" => Value::Int(a.borrow().len() as i64),
        "empty?" => Value::Bool(a.borrow().is_empty()),
        "nil?" => Value::Bool(false),
        "first" => a.borrow().first().cloned().unwrap_or(Value::Nil),
        "last" => a.borrow().last().cloned().unwrap_or(Value::Nil),
        "push" | "<<" => {
            a.borrow_mut().extend(args.iter().cloned());
            Value::Array(a.clone())
        }
        "pop" => a.borrow_mut().pop().unwrap_or(Value::Nil),
        "reverse" => Value::array(a.borrow().iter().rev().cloned().collect()),
        "join" => {
            let sep = args.first().map(Value::to_s).unwrap_or_default();
            Value::string(a.borrow().iter().map(Value::to_s).collect::<Vec<_>>().join(&sep))
        }
        "include?" => Value::Bool(a.borrow().iter().any(|v| *v == args.first().cloned().unwrap_or(Value::Nil))),
        "max" => extreme(&a.borrow(), std::cmp::Ordering::Greater)?,
        "min" => extreme(&a.borrow(), std::cmp::Ordering::Less)?,
        "sum" => a.borrow().iter().try_fold(Value::Int(0), |acc, v| add(acc, v.clone()))?,
        "[]" => match args.first() {
            Some(Value::Int(i)) => {
                let items = a.borrow();
                items.get(index_from(*i, items.len())).cloned().unwrap_or(Value::Nil)
            }
            _ => Value::Nil,
        },
        "each" => {
            if let Some(b) = block {
                for v in a.borrow().clone() {
                    vm.run_block(b, vec![v])?;
                }
            }
            Value::Array(a.clone())
        }
        "map" | "collect" => {
            if let Some(b) = block {
                let mut out = Vec::with_capacity(a.borrow().len());
                for v in a.borrow().clone() {
                    out.push(vm.run_block(b, vec![v])?);
                }
                Value::array(out)
            } else {
                Value::Array(a.clone())
            }
        }
        "select" | "filter" => {
            if let Some(b) = block {
                let mut out = Vec::new();
                for v in a.borrow().clone() {
                    if vm.run_block(b, vec![v.clone()])?.truthy() {
                        out.push(v);
                    }
                }
                Value::array(out)
            } else {
                Value::Array(a.clone())
            }
        }
        _ => return Ok(None),
    }))
}

fn extreme(items: &[Value], want: std::cmp::Ordering) -> Result<Value, VmError> {
    let mut iter = items.iter();
    let mut best = iter.next().cloned().unwrap_or(Value::Nil);
    for v in iter {
        if crate::exec::arith::cmp_values(v, &best)? == want {
            best = v.clone();
        }
    }
    Ok(best)
}

fn hash_ops(h: &Rc<RefCell<Vec<(Value, Value)>>>, name: &str, args: &[Value]) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "length" | "size" => Value::Int(h.borrow().len() as i64),
        "empty?" => Value::Bool(h.borrow().is_empty()),
        "nil?" => Value::Bool(false),
        "keys" => Value::array(h.borrow().iter().map(|(k, _)| k.clone()).collect()),
        "values" => Value::array(h.borrow().iter().map(|(_, v)| v.clone()).collect()),
        "[]" => {
            let key = args.first().cloned().unwrap_or(Value::Nil);
            h.borrow().iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone()).unwrap_or(Value::Nil)
        }
        "[]=" => {
            let key = args.first().cloned().unwrap_or(Value::Nil);
            let value = args.get(1).cloned().unwrap_or(Value::Nil);
            let mut pairs = h.borrow_mut();
            if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value.clone();
            } else {
                pairs.push((key, value.clone()));
            }
            value
        }
        "key?" | "has_key?" | "include?" => {
            let key = args.first().cloned().unwrap_or(Value::Nil);
            Value::Bool(h.borrow().iter().any(|(k, _)| *k == key))
        }
        _ => return Ok(None),
    }))
}

fn symbol_ops(s: &Symbol, name: &str) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "to_s" => Value::string(s.as_str()),
        "to_sym" => Value::Symbol(s.clone()),
        "nil?" => Value::Bool(false),
        "length" | "size" => Value::Int(s.as_str().chars().count() as i64),
        _ => return Ok(None),
    }))
}

fn bool_ops(b: bool, name: &str) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "!" => Value::Bool(!b),
        "to_s" => Value::string(b.to_string()),
        "nil?" => Value::Bool(false),
        _ => return Ok(None),
    }))
}

fn nil_ops(name: &str) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "!" => Value::Bool(true),
        "to_s" => Value::string(""),
        "to_a" => Value::array(vec![]),
        "nil?" => Value::Bool(true),
        _ => return Ok(None),
    }))
}

fn range_ops(r: &Rc<RangeValue>, name: &str, args: &[Value], vm: &Vm, block: &Option<Rc<BlockObject>>) -> Result<Option<Value>, VmError> {
    Ok(Some(match name {
        "nil?" => Value::Bool(false),
        "include?" | "===" | "cover?" => {
            let v = args.first().cloned().unwrap_or(Value::Nil);
            let lo_ok = crate::exec::arith::cmp_values(&r.lo, &v).map(|o| o != std::cmp::Ordering::Greater).unwrap_or(false);
            let hi_ok = match crate::exec::arith::cmp_values(&v, &r.hi) {
                Ok(o) if r.exclusive => o == std::cmp::Ordering::Less,
                Ok(o) => o != std::cmp::Ordering::Greater,
                Err(_) => false,
            };
            Value::Bool(lo_ok && hi_ok)
        }
        "to_a" | "to_ary" => Value::array(to_vec(r)?),
        "each" => {
            if let Some(b) = block {
                for v in to_vec(r)? {
                    vm.run_block(b, vec![v])?;
                }
            }
            Value::Range(r.clone())
        }
        _ => return Ok(None),
    }))
}

fn to_vec(r: &RangeValue) -> Result<Vec<Value>, VmError> {
    let (Value::Int(lo), Value::Int(hi)) = (&r.lo, &r.hi) else {
        return Err(VmError::TypeError("can't iterate a non-Integer Range".to_string()));
    };
    let hi = if r.exclusive { *hi } else { *hi + 1 };
    Ok((*lo..hi).map(Value::Int).collect())
}
