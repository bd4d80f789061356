//! # Stack-Based Bytecode Virtual Machine (Runtime)
//!
//! Executes the `Instr` stream the compiler produces.
//!
//! ## High-level model
//! - **Operand stack (`stack`)**: holds `Value`s consumed/produced by ops.
//! - **Environment (`env`)**: the current frame's variables. There is no
//!   separate global scope — top-level code runs in its own frame like
//!   any function, and a called function starts a brand-new, empty
//!   environment seeded only with its bound parameters. Functions never
//!   see a caller's locals; there are no closures.
//! - **Call stack (`call_stack`)**: one `(return_pc, saved_env)` entry
//!   per active call, restored on `Return`.
//! - **Program counter (`pc`)**: index into `code`.
//! - **Advance flag (`advance_pc`)**: cleared by control-flow ops that
//!   set `pc` themselves (`Jump`, `JumpIfFalse`, `Call`, `Return`,
//!   `IterNext`, `Halt`).
//!
//! The machine fails fast: the first `RuntimeError` any instruction
//! produces ends execution immediately, there is no handler/unwind
//! mechanism to catch it.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::bytecode::Instr;
use crate::error::RuntimeError;
use crate::value::Value;

mod ops_arith;
mod ops_control;
mod ops_struct;

pub(super) fn pop(stack: &mut Vec<Value>) -> Result<Value, RuntimeError> {
    stack.pop().ok_or(RuntimeError::StackUnderflow)
}

struct Frame {
    return_pc: usize,
    saved_env: HashMap<String, Value>,
}

/// Runs a compiled instruction stream to completion, writing `PRINT`
/// output to the process's standard output.
///
/// Returns the value passed to the outermost `Return` — or `Nil` if
/// execution reaches `Halt` without one, e.g. a script with no trailing
/// `return` at top level.
pub fn run(code: &[Instr]) -> Result<Value, RuntimeError> {
    run_with_output(code, &mut io::stdout())
}

/// Same as [`run`], but `PRINT` writes to `out` instead of stdout —
/// what the test suite uses to assert on program output without
/// capturing the real process stream.
pub fn run_with_output<W: Write>(code: &[Instr], out: &mut W) -> Result<Value, RuntimeError> {
    let mut stack: Vec<Value> = Vec::new();
    let mut env: HashMap<String, Value> = HashMap::new();
    let mut call_stack: Vec<Frame> = Vec::new();
    let mut pc: usize = 0;
    let mut result = Value::Nil;

    while pc < code.len() {
        let mut advance_pc = true;

        match &code[pc] {
            Instr::PushInt(n) => stack.push(Value::Int(*n)),
            Instr::PushStr(s) => stack.push(Value::Str(s.clone())),
            Instr::PushBool(b) => stack.push(Value::Bool(*b)),
            Instr::PushNil => stack.push(Value::Nil),

            Instr::LoadVar(name) => {
                // Unbound variables default to Int(0) rather than erroring.
                stack.push(env.get(name).cloned().unwrap_or(Value::Int(0)));
            }
            Instr::StoreVar(name) => {
                let value = pop(&mut stack)?;
                env.insert(name.clone(), value);
            }

            Instr::Add => ops_arith::handle_add(&mut stack)?,
            Instr::Sub => ops_arith::handle_sub(&mut stack)?,
            Instr::Mul => ops_arith::handle_mul(&mut stack)?,
            Instr::Div => ops_arith::handle_div(&mut stack)?,
            Instr::Neg => ops_arith::handle_neg(&mut stack)?,

            Instr::Gt => ops_arith::handle_gt(&mut stack)?,
            Instr::Gte => ops_arith::handle_gte(&mut stack)?,
            Instr::Lt => ops_arith::handle_lt(&mut stack)?,
            Instr::Lte => ops_arith::handle_lte(&mut stack)?,
            Instr::Eq => ops_arith::handle_eq(&mut stack)?,
            Instr::Neq => ops_arith::handle_neq(&mut stack)?,

            Instr::And => ops_arith::handle_and(&mut stack)?,
            Instr::Or => ops_arith::handle_or(&mut stack)?,
            Instr::Not => ops_arith::handle_not(&mut stack)?,

            Instr::Jump(target) => {
                pc = *target;
                advance_pc = false;
            }
            Instr::JumpIfFalse(target) => {
                let cond = pop(&mut stack)?;
                if !cond.is_truthy() {
                    pc = *target;
                    advance_pc = false;
                }
            }

            Instr::BuildArray(n) => ops_struct::handle_build_array(*n, &mut stack)?,
            Instr::BuildRange => ops_struct::handle_build_range(&mut stack)?,
            Instr::IndexGet => ops_struct::handle_index_get(&mut stack)?,
            Instr::IndexSet => ops_struct::handle_index_set(&mut stack)?,

            Instr::IterInit => ops_struct::handle_iter_init(&mut stack)?,
            Instr::IterNext(target) => {
                let exhausted = ops_struct::handle_iter_next(&mut stack)?;
                if exhausted {
                    pc = *target;
                    advance_pc = false;
                }
            }

            Instr::Call(fnref) => {
                let new_env = ops_control::bind_call(fnref, &mut stack)?;
                let saved_env = std::mem::replace(&mut env, new_env);
                call_stack.push(Frame {
                    return_pc: pc + 1,
                    saved_env,
                });
                pc = fnref.entry;
                advance_pc = false;
            }
            Instr::Return => {
                // Per spec: an empty stack at RETURN yields Nil rather
                // than a StackUnderflow error. The compiler always
                // emits a value-producing expression before RETURN, so
                // this only matters for hand-assembled instruction
                // streams, not anything the compiler itself emits.
                let value = stack.pop().unwrap_or(Value::Nil);
                match call_stack.pop() {
                    Some(frame) => {
                        env = frame.saved_env;
                        pc = frame.return_pc;
                        stack.push(value);
                    }
                    None => {
                        result = value;
                        pc = code.len();
                    }
                }
                advance_pc = false;
            }

            Instr::Print => {
                let value = pop(&mut stack)?;
                let _ = writeln!(out, "{}", value.to_display_string());
            }
            Instr::Pop => {
                pop(&mut stack)?;
            }
            Instr::Halt => {
                pc = code.len();
                advance_pc = false;
            }
        }

        if advance_pc {
            pc += 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests;
