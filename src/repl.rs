//! # Rayvn REPL
//!
//! An interactive read-eval-print loop, grounded on the teacher's
//! `repl.rs`: it tracks brace depth so multi-line `fn`/`if`/`while`/
//! `for` blocks can be entered over several lines, accumulates
//! successfully-executed source as history so later input can see
//! earlier `let`/`fn` bindings, and executes by re-invoking the current
//! binary against a temporary source file rather than re-running the
//! pipeline in-process — this keeps REPL semantics identical to batch
//! execution by construction, at the cost of one process spawn per
//! evaluated block.
//!
//! The one thing dropped from the teacher's version is the `;;;omg`
//! header it stamped onto the temp file: Rayvn source files have no
//! required header, so the REPL's accumulated buffer is valid Rayvn
//! source as-is.

use std::fs;
use std::io::{self, Write};
use std::process::Command;

/// Run an interactive REPL session on stdin/stdout until EOF or an
/// explicit `exit`/`quit`.
pub fn repl_interpret() {
    println!("Rayvn REPL");
    println!("Type `exit` or `quit` to leave.");

    let mut history = String::new();
    let mut last_output = String::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut brace_depth: i32 = 0;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };
        print!("{}", prompt);
        io::stdout().flush().unwrap();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap() == 0 {
            println!();
            break;
        }

        let trimmed = line.trim();
        if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
            break;
        }

        let mut string_open = false;
        for ch in line.chars() {
            match ch {
                '"' => string_open = !string_open,
                '{' if !string_open => brace_depth += 1,
                '}' if !string_open => brace_depth -= 1,
                _ => {}
            }
        }

        buffer.push(line);

        if brace_depth > 0 {
            continue;
        }

        let block = buffer.join("");
        let source = format!("{}{}", history, block);

        let temp_path = std::env::temp_dir().join(format!("rayvn_repl_{}.rv", std::process::id()));
        if fs::write(&temp_path, &source).is_err() {
            println!("failed to write temp file");
            buffer.clear();
            brace_depth = 0;
            continue;
        }

        let output = Command::new(std::env::current_exe().unwrap())
            .arg(&temp_path)
            .output();

        let _ = fs::remove_file(&temp_path);

        match output {
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).to_string();
                if !stderr.is_empty() {
                    print!("{}", stderr);
                    buffer.clear();
                    brace_depth = 0;
                    continue;
                }

                let stdout = String::from_utf8_lossy(&out.stdout).to_string();
                if stdout.starts_with(&last_output) {
                    print!("{}", &stdout[last_output.len()..]);
                } else {
                    print!("{}", stdout);
                }
                io::stdout().flush().unwrap();

                last_output = stdout;
                history.push_str(&block);
                buffer.clear();
                brace_depth = 0;
            }
            Err(_) => {
                println!("failed to run script");
                buffer.clear();
                brace_depth = 0;
            }
        }
    }
}
