use super::*;
use crate::bytecode::Instr;
use crate::error::RuntimeError;
use crate::value::{FnRef, Value};
use std::rc::Rc;

fn run_str(code: &[Instr]) -> (Result<Value, RuntimeError>, String) {
    let mut out = Vec::new();
    let result = run_with_output(code, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn print_writes_formatted_value_to_the_supplied_writer() {
    let code = vec![Instr::PushInt(10), Instr::Print, Instr::Halt];
    let (result, out) = run_str(&code);
    assert!(result.is_ok());
    assert_eq!(out, "10\n");
}

#[test]
fn load_var_of_unbound_name_defaults_to_int_zero() {
    let code = vec![
        Instr::LoadVar("x".to_string()),
        Instr::Print,
        Instr::Halt,
    ];
    let (_, out) = run_str(&code);
    assert_eq!(out, "0\n");
}

#[test]
fn store_then_load_round_trips_through_env() {
    let code = vec![
        Instr::PushInt(42),
        Instr::StoreVar("x".to_string()),
        Instr::LoadVar("x".to_string()),
        Instr::Print,
        Instr::Halt,
    ];
    let (_, out) = run_str(&code);
    assert_eq!(out, "42\n");
}

#[test]
fn pop_on_empty_stack_is_a_runtime_error() {
    let code = vec![Instr::Pop, Instr::Halt];
    let (result, _) = run_str(&code);
    assert!(matches!(result, Err(RuntimeError::StackUnderflow)));
}

#[test]
fn jump_if_false_skips_the_branch_when_condition_is_falsy() {
    let code = vec![
        Instr::PushBool(false),
        Instr::JumpIfFalse(4),
        Instr::PushInt(1),
        Instr::Print,
        Instr::Halt,
    ];
    let (_, out) = run_str(&code);
    assert_eq!(out, "");
}

#[test]
fn build_array_preserves_push_order() {
    let code = vec![
        Instr::PushInt(1),
        Instr::PushInt(2),
        Instr::PushInt(3),
        Instr::BuildArray(3),
        Instr::Print,
        Instr::Halt,
    ];
    let (_, out) = run_str(&code);
    assert_eq!(out, "[1, 2, 3]\n");
}

#[test]
fn index_set_then_index_get_round_trips_and_leaves_other_elements_unchanged() {
    let code = vec![
        Instr::PushInt(1),
        Instr::PushInt(2),
        Instr::PushInt(3),
        Instr::BuildArray(3),
        Instr::StoreVar("a".to_string()),
        Instr::LoadVar("a".to_string()),
        Instr::PushInt(1),
        Instr::PushInt(9),
        Instr::IndexSet,
        Instr::Pop,
        Instr::LoadVar("a".to_string()),
        Instr::Print,
        Instr::Halt,
    ];
    let (_, out) = run_str(&code);
    assert_eq!(out, "[1, 9, 3]\n");
}

#[test]
fn index_set_on_non_array_is_a_runtime_error() {
    let code = vec![
        Instr::PushInt(5),
        Instr::PushInt(0),
        Instr::PushInt(1),
        Instr::IndexSet,
        Instr::Halt,
    ];
    let (result, _) = run_str(&code);
    assert!(matches!(result, Err(RuntimeError::IndexAssignNonArray("int"))));
}

#[test]
fn iter_next_over_a_range_exhausts_after_the_expected_count() {
    // range(0, 3, 1): iterate, counting how many times the body runs.
    // `count` starts unbound and so reads as Int(0) on the first pass.
    let mut code = vec![
        Instr::PushInt(0),
        Instr::PushInt(3),
        Instr::PushInt(1),
        Instr::BuildRange,
        Instr::IterInit,
    ];
    let loop_start = code.len();
    code.push(Instr::IterNext(0)); // patched to exit_at below
    code.push(Instr::StoreVar("i".to_string()));
    code.push(Instr::LoadVar("count".to_string()));
    code.push(Instr::PushInt(1));
    code.push(Instr::Add);
    code.push(Instr::StoreVar("count".to_string()));
    code.push(Instr::Jump(loop_start));
    let exit_at = code.len();
    code.push(Instr::LoadVar("count".to_string()));
    code.push(Instr::Print);
    code.push(Instr::Halt);
    if let Instr::IterNext(t) = &mut code[loop_start] {
        *t = exit_at;
    }

    let (result, out) = run_str(&code);
    assert!(result.is_ok());
    assert_eq!(out, "3\n");
}

#[test]
fn call_binds_params_left_to_right_regardless_of_pop_order() {
    // entry 5 computes a - b with a bound to the first parameter name and
    // b to the second, called as f(10, 3).
    let fnref = FnRef {
        entry: 5,
        param_names: Rc::new(vec!["a".to_string(), "b".to_string()]),
    };
    let code = vec![
        Instr::PushInt(10),
        Instr::PushInt(3),
        Instr::Call(fnref),
        Instr::Print,
        Instr::Halt,
        Instr::LoadVar("a".to_string()),
        Instr::LoadVar("b".to_string()),
        Instr::Sub,
        Instr::Return,
    ];
    let (result, out) = run_str(&code);
    assert!(result.is_ok());
    assert_eq!(out, "7\n");
}

#[test]
fn return_with_empty_stack_at_top_level_yields_nil() {
    let code = vec![Instr::Return];
    let (result, _) = run_str(&code);
    assert!(matches!(result, Ok(Value::Nil)));
}
