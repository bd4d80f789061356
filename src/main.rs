//! Rayvn CLI entry point.
//!
//! Behavior summary, grounded on the teacher's `main.rs` argument
//! handling (help/version flags, no-args REPL) with the `.omgb`
//! embedded-interpreter scheme dropped — Rayvn has no separate
//! bytecode serialization format, so there is nothing to embed; the
//! compiler and VM run in-process against whatever `.rv` source file
//! is named on the command line.

use std::env;
use std::fs;
use std::process::ExitCode;

use rayvn::repl::repl_interpret;
use rayvn::run_source;

const VERSION: &str = "0.1.0";

fn usage() -> String {
    format!(
        r#"Rayvn v{0}

Usage:
    rayvn <script.rv>

Arguments:
    <script.rv>
        Path to a Rayvn source file to execute.

Example:
    rayvn hello.rv

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show runtime version."#,
        VERSION
    )
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        repl_interpret();
        return ExitCode::SUCCESS;
    }

    if args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return ExitCode::SUCCESS;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!(
            "rayvn-build-{}-{}: v{}",
            env::consts::OS,
            env::consts::ARCH,
            VERSION
        );
        return ExitCode::SUCCESS;
    }

    let path = &args[1];
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("rayvn: cannot read '{}': {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match run_source(&source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
