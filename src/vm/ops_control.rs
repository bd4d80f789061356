//! # Call Binding
//!
//! `Instr::Call` is handled directly in `vm::run` (it touches the call
//! stack and program counter, not just the operand stack), but binding
//! the popped arguments to the callee's parameter names is pulled out
//! here since it's the one piece of real logic in that step.

use std::collections::HashMap;

use super::pop;
use crate::error::RuntimeError;
use crate::value::{FnRef, Value};

/// Pops `fnref.arity()` arguments off the stack (the last-pushed
/// argument comes off first) and binds them to `fnref.param_names` in
/// left-to-right declaration order, regardless of pop order — this is
/// the invariant spec.md §8 calls out explicitly.
pub(super) fn bind_call(fnref: &FnRef, stack: &mut Vec<Value>) -> Result<HashMap<String, Value>, RuntimeError> {
    let mut args = Vec::with_capacity(fnref.arity());
    for _ in 0..fnref.arity() {
        args.push(pop(stack)?);
    }
    args.reverse();

    let mut env = HashMap::with_capacity(fnref.arity());
    for (name, value) in fnref.param_names.iter().zip(args) {
        env.insert(name.clone(), value);
    }
    Ok(env)
}
