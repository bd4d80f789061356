//! # Rayvn Abstract Syntax Tree
//!
//! Node shapes mirror `original_source/compiler/rayvn_ast.py` (inferred
//! from how `parser.py`/`compiler.py` construct and consume each node),
//! rendered as two closed Rust enums instead of one class per node.
//!
//! `Expr`/`Stmt` being closed enums means `compiler::Compiler::compile_*`
//! match exhaustively — there is no "unknown AST node" runtime error
//! tier here, unlike the dynamically-typed source; the compiler can't be
//! handed a node it doesn't know how to lower.

/// Binary operators, matching the token identities named in the spec's
/// operator-to-opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    And,
    Or,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Number(i64),
    Bool(bool),
    Str(String),
    Var(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
    /// `range(start, end[, step])`; `step` defaults to `1` at compile
    /// time when absent.
    Range(Box<Expr>, Box<Expr>, Option<Box<Expr>>),
    Call(String, Vec<Expr>),
    Array(Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Let(String, Expr),
    Assign(String, Expr),
    IndexAssign(Expr, Expr, Expr),
    Print(Expr),
    Expr(Expr),
    /// `(condition, body)` per branch, in source order; `if`/`elseif`
    /// chain followed by an optional trailing `else`.
    If(Vec<(Expr, Vec<Stmt>)>, Option<Vec<Stmt>>),
    While(Expr, Vec<Stmt>),
    ForIn(String, Expr, Vec<Stmt>),
    FunctionDef(String, Vec<String>, Vec<Stmt>),
    Return(Option<Expr>),
    Break,
    Continue,
}

#[derive(Clone, Debug)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
