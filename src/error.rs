//! # Error Handling for the Rayvn Compiler & VM
//!
//! Two tiers, matching the two phases of the pipeline:
//!
//! - [`CompileError`] — raised while lexing, parsing, or compiling source
//!   text. All variants are fatal; there is no recovery.
//! - [`RuntimeError`] — raised while the VM executes a compiled
//!   instruction stream. All variants are fatal and abort the run.
//!
//! Both implement [`fmt::Display`] and [`std::error::Error`] so they
//! compose with `?` and print a one-line diagnostic from `main`.

use std::fmt;

/// Errors raised before a single instruction executes: lexing, parsing,
/// or compiling the AST into bytecode.
#[derive(Debug, PartialEq)]
pub enum CompileError {
    /// The lexer found a character it doesn't recognize.
    UnexpectedChar(char),
    /// A `"` was opened but never closed before end of input.
    UnterminatedString,
    /// A `***` block comment was opened but never closed.
    UnterminatedBlockComment,
    /// The parser expected one token kind and found another.
    UnexpectedToken { expected: String, found: String },
    /// `let`/`for` must be followed by an identifier.
    ExpectedIdentifier { after: &'static str },
    /// `break`/`continue` used outside of any enclosing loop.
    LoopControlOutsideLoop(&'static str),
    /// A call names a function that hasn't been defined yet at this
    /// point in the source. Forward references are a compile error —
    /// a function must be fully defined before anything can call it.
    UnknownFunction(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnexpectedChar(c) => write!(f, "CompileError: unexpected character '{}'", c),
            CompileError::UnterminatedString => {
                write!(f, "CompileError: unterminated string literal")
            }
            CompileError::UnterminatedBlockComment => {
                write!(f, "CompileError: unterminated block comment")
            }
            CompileError::UnexpectedToken { expected, found } => write!(
                f,
                "CompileError: expected {}, found {}",
                expected, found
            ),
            CompileError::ExpectedIdentifier { after } => {
                write!(f, "CompileError: expected identifier after '{}'", after)
            }
            CompileError::LoopControlOutsideLoop(kw) => {
                write!(f, "CompileError: '{}' used outside of a loop", kw)
            }
            CompileError::UnknownFunction(name) => {
                write!(f, "CompileError: call to undefined function '{}'", name)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Errors raised by the VM while executing bytecode.
#[derive(Debug, PartialEq)]
pub enum RuntimeError {
    /// An opcode popped the operand stack when it was empty.
    StackUnderflow,
    /// `ITER_INIT` was applied to a value that isn't iterable.
    NotIterable(&'static str),
    /// An index used in `INDEX_GET`/`INDEX_SET` was not an integer.
    NonIntegerIndex,
    /// An index was negative or past the end of the target.
    IndexOutOfBounds(i64),
    /// `INDEX_SET` targeted something other than an array.
    IndexAssignNonArray(&'static str),
    /// An operator was applied to operand types it doesn't support.
    TypeMismatch(String),
    /// `/` or a modulo-like operation divided by zero.
    DivisionByZero,
    /// A user-defined function was called before it was compiled, or a
    /// name wasn't found in the function table at all.
    UndefinedFunction(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackUnderflow => write!(f, "RuntimeError: operand stack underflow"),
            RuntimeError::NotIterable(ty) => {
                write!(f, "RuntimeError: value of type {} is not iterable", ty)
            }
            RuntimeError::NonIntegerIndex => {
                write!(f, "RuntimeError: index must be an integer")
            }
            RuntimeError::IndexOutOfBounds(i) => {
                write!(f, "RuntimeError: index {} out of bounds", i)
            }
            RuntimeError::IndexAssignNonArray(ty) => write!(
                f,
                "RuntimeError: cannot assign by index into a value of type {}",
                ty
            ),
            RuntimeError::TypeMismatch(msg) => write!(f, "RuntimeError: {}", msg),
            RuntimeError::DivisionByZero => write!(f, "RuntimeError: division by zero"),
            RuntimeError::UndefinedFunction(name) => {
                write!(f, "RuntimeError: undefined function '{}'", name)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
