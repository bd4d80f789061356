//! # Arithmetic, Comparison, and Boolean Operations
//!
//! Handlers for every `Instr` that combines one or two `Value`s into a
//! new one: `+ - * /` and unary `-`, the six comparison operators, `==`/
//! `!=`, and the strict `and`/`or`/`not` trio.
//!
//! ## Typing rules
//! - `+` concatenates `Str + Str`; otherwise it, `-`, `*` operate on
//!   `Int`/`Float` and stay `Int` unless either operand is already a
//!   `Float` (which can only have come from a prior `/`).
//! - `/` always divides as `f64` and always produces `Float`, per the
//!   source's real-division choice (spec.md §9).
//! - Comparisons accept `Str`-`Str` (lexicographic) or numeric-numeric;
//!   anything else is a `TypeMismatch`.
//! - `==`/`!=` compare same-variant values structurally; comparing
//!   across variants is a `TypeMismatch`, not a silent `false` (spec.md
//!   §4.2 calls this out as a deliberate design choice, unlike the
//!   source language this VM implements).

use std::rc::Rc;

use super::pop;
use crate::error::RuntimeError;
use crate::value::Value;

fn as_f64(v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::TypeMismatch(format!(
            "expected a number, found {}",
            other.type_name()
        ))),
    }
}

fn values_equal(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Float(x), Value::Float(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Range { start: s1, end: e1, step: p1 }, Value::Range { start: s2, end: e2, step: p2 }) => {
            Ok(s1 == s2 && e1 == e2 && p1 == p2)
        }
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return Ok(true);
            }
            let xb = x.borrow();
            let yb = y.borrow();
            if xb.len() != yb.len() {
                return Ok(false);
            }
            for (xi, yi) in xb.iter().zip(yb.iter()) {
                if !values_equal(xi, yi)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Iterator(x), Value::Iterator(y)) => Ok(Rc::ptr_eq(x, y)),
        (Value::FnRef(x), Value::FnRef(y)) => Ok(x.entry == y.entry),
        (a, b) => Err(RuntimeError::TypeMismatch(format!(
            "cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub(super) fn handle_add(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    match (&a, &b) {
        (Value::Str(sa), Value::Str(sb)) => stack.push(Value::Str(sa.clone() + sb)),
        (Value::Int(ai), Value::Int(bi)) => stack.push(Value::Int(ai + bi)),
        _ => stack.push(Value::Float(as_f64(&a)? + as_f64(&b)?)),
    }
    Ok(())
}

pub(super) fn handle_sub(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    if let (Value::Int(ai), Value::Int(bi)) = (&a, &b) {
        stack.push(Value::Int(ai - bi));
    } else {
        stack.push(Value::Float(as_f64(&a)? - as_f64(&b)?));
    }
    Ok(())
}

pub(super) fn handle_mul(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    if let (Value::Int(ai), Value::Int(bi)) = (&a, &b) {
        stack.push(Value::Int(ai * bi));
    } else {
        stack.push(Value::Float(as_f64(&a)? * as_f64(&b)?));
    }
    Ok(())
}

/// Real division: always consumes `f64`s and always pushes `Float`,
/// even when both operands are `Int` and the result divides evenly.
pub(super) fn handle_div(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let bf = as_f64(&b)?;
    if bf == 0.0 {
        return Err(RuntimeError::DivisionByZero);
    }
    stack.push(Value::Float(as_f64(&a)? / bf));
    Ok(())
}

pub(super) fn handle_neg(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    match pop(stack)? {
        Value::Int(i) => stack.push(Value::Int(-i)),
        Value::Float(f) => stack.push(Value::Float(-f)),
        other => {
            return Err(RuntimeError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}

fn compare(stack: &mut Vec<Value>, f: impl Fn(std::cmp::Ordering) -> bool) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let ordering = match (&a, &b) {
        (Value::Str(sa), Value::Str(sb)) => sa.cmp(sb),
        _ => as_f64(&a)?
            .partial_cmp(&as_f64(&b)?)
            .ok_or_else(|| RuntimeError::TypeMismatch("cannot compare NaN".to_string()))?,
    };
    stack.push(Value::Bool(f(ordering)));
    Ok(())
}

pub(super) fn handle_gt(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    compare(stack, |o| o == std::cmp::Ordering::Greater)
}

pub(super) fn handle_gte(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    compare(stack, |o| o != std::cmp::Ordering::Less)
}

pub(super) fn handle_lt(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    compare(stack, |o| o == std::cmp::Ordering::Less)
}

pub(super) fn handle_lte(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    compare(stack, |o| o != std::cmp::Ordering::Greater)
}

pub(super) fn handle_eq(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let eq = values_equal(&a, &b)?;
    stack.push(Value::Bool(eq));
    Ok(())
}

pub(super) fn handle_neq(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let eq = values_equal(&a, &b)?;
    stack.push(Value::Bool(!eq));
    Ok(())
}

/// Strict: both operands are always evaluated and already on the stack
/// by the time this runs (see spec.md §4.1/§9 on non-short-circuiting
/// `and`/`or`).
pub(super) fn handle_and(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(Value::Bool(a.is_truthy() && b.is_truthy()));
    Ok(())
}

pub(super) fn handle_or(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(Value::Bool(a.is_truthy() || b.is_truthy()));
    Ok(())
}

pub(super) fn handle_not(stack: &mut Vec<Value>) -> Result<(), RuntimeError> {
    let v = pop(stack)?;
    stack.push(Value::Bool(!v.is_truthy()));
    Ok(())
}
