//! # Rayvn Compiler
//!
//! Lowers an `ast::Program` into a flat `Vec<bytecode::Instr>` plus a
//! function table, ported from `original_source/compiler/ByteCode/compiler.py`.
//! The `emit`/`patch` pair and the loop-fixup stack for `break`/`continue`
//! are the same shape as the original; what changes is everything tied
//! to Rust's static dispatch (`match` over `ast::Stmt`/`ast::Expr`
//! instead of `isinstance` chains) and to the stricter function model
//! (forward references are rejected here instead of silently resolved
//! at call time).

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BinOp, Expr, Program, Stmt};
use crate::bytecode::Instr;
use crate::error::CompileError;
use crate::value::FnRef;

/// Jump fixups pending for one enclosing loop. `continue` inside a
/// `for` loop jumps back to the `IterNext` that starts each iteration;
/// inside a `while` loop it jumps back to the condition check. `break`
/// always jumps to the loop's cleanup/exit point, patched in once the
/// loop has been fully compiled.
struct LoopFixup {
    continue_target: usize,
    breaks: Vec<usize>,
}

pub struct Compiler {
    code: Vec<Instr>,
    functions: HashMap<String, FnRef>,
    loop_stack: Vec<LoopFixup>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            code: Vec::new(),
            functions: HashMap::new(),
            loop_stack: Vec::new(),
        }
    }

    pub fn compile(mut self, program: &Program) -> Result<(Vec<Instr>, HashMap<String, FnRef>), CompileError> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        self.emit(Instr::Halt);
        Ok((self.code, self.functions))
    }

    fn emit(&mut self, instr: Instr) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    /// Rewrites the jump target embedded in the instruction at `at` to
    /// `target`, the current end of the instruction stream by convention.
    fn patch_jump(&mut self, at: usize, target: usize) {
        match &mut self.code[at] {
            Instr::Jump(t) | Instr::JumpIfFalse(t) | Instr::IterNext(t) => *t = target,
            other => panic!("patch_jump: instruction at {} is not a jump: {:?}", at, other),
        }
    }

    fn here(&self) -> usize {
        self.code.len()
    }

    fn compile_block(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let(name, value) => {
                self.compile_expr(value)?;
                self.emit(Instr::StoreVar(name.clone()));
            }

            Stmt::Assign(name, value) => {
                self.compile_expr(value)?;
                self.emit(Instr::StoreVar(name.clone()));
            }

            Stmt::IndexAssign(array, index, value) => {
                self.compile_expr(array)?;
                self.compile_expr(index)?;
                self.compile_expr(value)?;
                self.emit(Instr::IndexSet);
            }

            Stmt::Print(value) => {
                self.compile_expr(value)?;
                self.emit(Instr::Print);
            }

            Stmt::Expr(expr) => {
                self.compile_expr(expr)?;
                self.emit(Instr::Pop);
            }

            Stmt::If(branches, else_body) => self.compile_if(branches, else_body)?,
            Stmt::While(condition, body) => self.compile_while(condition, body)?,
            Stmt::ForIn(var, iterable, body) => self.compile_for_in(var, iterable, body)?,
            Stmt::FunctionDef(name, params, body) => self.compile_function_def(name, params, body)?,

            Stmt::Return(value) => {
                match value {
                    Some(expr) => self.compile_expr(expr)?,
                    None => {
                        self.emit(Instr::PushNil);
                    }
                }
                self.emit(Instr::Return);
            }

            Stmt::Break => {
                let fixup = self
                    .loop_stack
                    .last_mut()
                    .ok_or(CompileError::LoopControlOutsideLoop("break"))?;
                let jump_at = self.code.len();
                fixup.breaks.push(jump_at);
                self.emit(Instr::Jump(0));
            }

            Stmt::Continue => {
                let target = self
                    .loop_stack
                    .last()
                    .ok_or(CompileError::LoopControlOutsideLoop("continue"))?
                    .continue_target;
                self.emit(Instr::Jump(target));
            }
        }
        Ok(())
    }

    fn compile_if(
        &mut self,
        branches: &[(Expr, Vec<Stmt>)],
        else_body: &Option<Vec<Stmt>>,
    ) -> Result<(), CompileError> {
        let mut end_jumps = Vec::new();

        for (condition, body) in branches {
            self.compile_expr(condition)?;
            let skip_at = self.emit(Instr::JumpIfFalse(0));
            self.compile_block(body)?;
            end_jumps.push(self.emit(Instr::Jump(0)));
            let next = self.here();
            self.patch_jump(skip_at, next);
        }

        if let Some(body) = else_body {
            self.compile_block(body)?;
        }

        let end = self.here();
        for at in end_jumps {
            self.patch_jump(at, end);
        }
        Ok(())
    }

    fn compile_while(&mut self, condition: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        let loop_start = self.here();
        self.compile_expr(condition)?;
        let exit_at = self.emit(Instr::JumpIfFalse(0));

        self.loop_stack.push(LoopFixup {
            continue_target: loop_start,
            breaks: Vec::new(),
        });
        self.compile_block(body)?;
        let fixup = self.loop_stack.pop().expect("pushed above");

        self.emit(Instr::Jump(loop_start));
        let end = self.here();
        self.patch_jump(exit_at, end);
        for at in fixup.breaks {
            self.patch_jump(at, end);
        }
        Ok(())
    }

    /// Desugars into `IterInit` once, then a loop of `IterNext`/body.
    /// `IterNext` leaves the live iterator on the stack across
    /// iterations and pops it itself on exhaustion; `break` has to pop
    /// it explicitly since it leaves mid-iteration, hence the small
    /// `Pop` trampoline both break fixups and the natural loop-around
    /// share.
    fn compile_for_in(&mut self, var: &str, iterable: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        self.compile_expr(iterable)?;
        self.emit(Instr::IterInit);

        let loop_start = self.here();
        let next_at = self.emit(Instr::IterNext(0));
        self.emit(Instr::StoreVar(var.to_string()));

        self.loop_stack.push(LoopFixup {
            continue_target: loop_start,
            breaks: Vec::new(),
        });
        self.compile_block(body)?;
        let fixup = self.loop_stack.pop().expect("pushed above");

        self.emit(Instr::Jump(loop_start));
        let cleanup_at = self.emit(Instr::Pop);
        let end = self.here();

        self.patch_jump(next_at, end);
        for at in fixup.breaks {
            self.patch_jump(at, cleanup_at);
        }
        Ok(())
    }

    fn compile_function_def(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
    ) -> Result<(), CompileError> {
        let skip_at = self.emit(Instr::Jump(0));
        let entry = self.here();

        self.functions.insert(
            name.to_string(),
            FnRef {
                entry,
                param_names: Rc::new(params.to_vec()),
            },
        );

        self.compile_block(body)?;
        // Falling off the end of a function body returns nil.
        self.emit(Instr::PushNil);
        self.emit(Instr::Return);

        let after = self.here();
        self.patch_jump(skip_at, after);
        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(n) => {
                self.emit(Instr::PushInt(*n));
            }
            Expr::Bool(b) => {
                self.emit(Instr::PushBool(*b));
            }
            Expr::Str(s) => {
                self.emit(Instr::PushStr(s.clone()));
            }
            Expr::Var(name) => {
                self.emit(Instr::LoadVar(name.clone()));
            }
            Expr::Neg(inner) => {
                self.compile_expr(inner)?;
                self.emit(Instr::Neg);
            }
            Expr::Not(inner) => {
                self.compile_expr(inner)?;
                self.emit(Instr::Not);
            }
            Expr::Binary(lhs, op, rhs) => {
                self.compile_expr(lhs)?;
                self.compile_expr(rhs)?;
                self.emit(map_binary(*op));
            }
            Expr::Range(start, end, step) => {
                self.compile_expr(start)?;
                self.compile_expr(end)?;
                match step {
                    Some(s) => self.compile_expr(s)?,
                    None => {
                        self.emit(Instr::PushInt(1));
                    }
                }
                self.emit(Instr::BuildRange);
            }
            Expr::Call(name, args) => {
                let fnref = self
                    .functions
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CompileError::UnknownFunction(name.clone()))?;
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.emit(Instr::Call(fnref));
            }
            Expr::Array(elements) => {
                for element in elements {
                    self.compile_expr(element)?;
                }
                self.emit(Instr::BuildArray(elements.len()));
            }
            Expr::Index(target, index) => {
                self.compile_expr(target)?;
                self.compile_expr(index)?;
                self.emit(Instr::IndexGet);
            }
        }
        Ok(())
    }
}

fn map_binary(op: BinOp) -> Instr {
    match op {
        BinOp::Add => Instr::Add,
        BinOp::Sub => Instr::Sub,
        BinOp::Mul => Instr::Mul,
        BinOp::Div => Instr::Div,
        BinOp::Gt => Instr::Gt,
        BinOp::Gte => Instr::Gte,
        BinOp::Lt => Instr::Lt,
        BinOp::Lte => Instr::Lte,
        BinOp::Eq => Instr::Eq,
        BinOp::Neq => Instr::Neq,
        BinOp::And => Instr::And,
        BinOp::Or => Instr::Or,
    }
}
