//! # Rayvn
//!
//! A small dynamically-typed scripting language and its execution
//! pipeline: source text → tokens (`lexer`) → AST (`parser`/`ast`) →
//! linear bytecode (`compiler`/`bytecode`) → a stack-based VM (`vm`).
//!
//! [`run_source`] drives the whole pipeline and is what both the CLI
//! binary and the REPL use under the hood.

pub mod ast;
pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod value;
pub mod vm;

use std::fmt;

use error::{CompileError, RuntimeError};
use value::Value;

/// Either tier of failure the pipeline can produce, unified so
/// `run_source` has a single error type.
#[derive(Debug, PartialEq)]
pub enum Error {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl From<CompileError> for Error {
    fn from(e: CompileError) -> Self {
        Error::Compile(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Error::Runtime(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(e) => write!(f, "{}", e),
            Error::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

/// Lex, parse, compile, and run a complete Rayvn program.
///
/// Returns the value passed to the outermost `return`, or `Nil` if
/// execution falls off the end of the program without one.
pub fn run_source(source: &str) -> Result<Value, Error> {
    let tokens = lexer::Lexer::new(source).tokenize()?;
    let program = parser::Parser::new(tokens).parse()?;
    let (code, _functions) = compiler::Compiler::new().compile(&program)?;
    let value = vm::run(&code)?;
    Ok(value)
}
