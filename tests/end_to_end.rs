//! End-to-end scenarios from the Rayvn pipeline spec: source text in,
//! `log` output out. These drive the full lexer -> parser -> compiler ->
//! VM pipeline, capturing `log` output into a buffer so assertions can
//! check on exact printed lines, unlike the unit tests in `vm::tests`
//! which hand-assemble instruction streams.

use rayvn::{ast, compiler, error, lexer, parser, vm};

#[derive(Debug)]
enum Failure {
    Compile(error::CompileError),
    Runtime(error::RuntimeError),
}

impl From<error::CompileError> for Failure {
    fn from(e: error::CompileError) -> Self {
        Failure::Compile(e)
    }
}

impl From<error::RuntimeError> for Failure {
    fn from(e: error::RuntimeError) -> Self {
        Failure::Runtime(e)
    }
}

fn run_and_capture(source: &str) -> Result<String, Failure> {
    let tokens = lexer::Lexer::new(source).tokenize()?;
    let program: ast::Program = parser::Parser::new(tokens).parse()?;
    let (code, _functions) = compiler::Compiler::new().compile(&program)?;
    let mut out = Vec::new();
    vm::run_with_output(&code, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn lines(out: &str) -> Vec<&str> {
    out.lines().collect()
}

#[test]
fn let_then_log_prints_the_bound_value() {
    let out = run_and_capture("let x = 10\nlog x\n").unwrap();
    assert_eq!(lines(&out), vec!["10"]);
}

#[test]
fn function_call_returns_the_sum_of_its_arguments() {
    let source = r#"
fn add(a, b) {
    return a + b
}
log add(2, 3)
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["5"]);
}

#[test]
fn for_in_range_accumulates_the_expected_sum() {
    let source = r#"
let s = 0
for i in range(1, 5) {
    s = s + i
}
log s
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["10"]);
}

#[test]
fn array_index_assignment_mutates_in_place() {
    let source = r#"
let a = [1, 2, 3]
a[1] = 9
log a[0]
log a[1]
log a[2]
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["1", "9", "3"]);
}

#[test]
fn continue_inside_while_skips_the_trailing_log() {
    let source = r#"
let n = 0
while n < 3 {
    n = n + 1
    if n == 2 {
        continue
    }
    log n
}
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["1", "3"]);
}

#[test]
fn recursive_factorial_resolves_through_the_function_table() {
    let source = r#"
fn fact(n) {
    if n <= 1 {
        return 1
    }
    return n * fact(n - 1)
}
log fact(5)
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["120"]);
}

#[test]
fn for_loop_over_an_empty_range_runs_the_body_zero_times() {
    let source = r#"
let a = 7
for i in range(a, a) {
    log 999
}
log a
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["7"]);
}

#[test]
fn negative_step_range_counts_down() {
    let source = r#"
for i in range(10, 0, -1) {
    log i
}
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["10", "9", "8", "7", "6", "5", "4", "3", "2", "1"]);
}

#[test]
fn break_in_nested_loops_exits_only_the_innermost_loop() {
    let source = r#"
let hits = 0
for i in range(0, 3) {
    for j in range(0, 3) {
        if j == 1 {
            break
        }
        hits = hits + 1
    }
}
log hits
"#;
    // Each of the 3 outer iterations runs the inner loop exactly once
    // (j=0) before breaking on j=1, so hits == 3, not 0 (immediate
    // break without effect) or 9 (break failing to stop the inner loop).
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["3"]);
}

#[test]
fn reading_an_undefined_variable_yields_int_zero() {
    let out = run_and_capture("log undefined_name\n").unwrap();
    assert_eq!(lines(&out), vec!["0"]);
}

#[test]
fn function_without_explicit_return_yields_nil() {
    let source = r#"
fn noop() {
    let x = 1
}
log noop()
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["nil"]);
}

#[test]
fn break_and_continue_outside_a_loop_are_compile_errors() {
    assert!(matches!(run_and_capture("break\n"), Err(Failure::Compile(_))));
    assert!(matches!(run_and_capture("continue\n"), Err(Failure::Compile(_))));
}

#[test]
fn calling_an_undefined_function_is_a_compile_error() {
    assert!(matches!(
        run_and_capture("log missing()\n"),
        Err(Failure::Compile(_))
    ));
}

#[test]
fn unterminated_string_is_a_compile_error() {
    assert!(matches!(
        run_and_capture("let x = \"unterminated\n"),
        Err(Failure::Compile(_))
    ));
}

#[test]
fn division_produces_a_real_valued_result() {
    let out = run_and_capture("log 7 / 2\n").unwrap();
    assert_eq!(lines(&out), vec!["3.5"]);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert!(matches!(
        run_and_capture("log 1 / 0\n"),
        Err(Failure::Runtime(_))
    ));
}

#[test]
fn int_digit_indexing_agrees_with_most_significant_first_order() {
    let source = r#"
let n = 123
log n[0]
log n[1]
log n[2]
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["1", "2", "3"]);
}

#[test]
fn array_aliasing_is_observed_across_bindings() {
    let source = r#"
let a = [1, 2, 3]
let b = a
b[0] = 99
log a[0]
"#;
    let out = run_and_capture(source).unwrap();
    assert_eq!(lines(&out), vec!["99"]);
}
