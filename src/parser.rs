//! # Rayvn Parser
//!
//! Recursive-descent parser, ported from
//! `original_source/compiler/parser.py` onto the `lexer`/`ast` types.
//! Precedence, low to high: `or > and > comparison > term > factor >
//! unary > primary`, with postfix `[index]` and `(call)` chaining after
//! any primary expression.
//!
//! Two source quirks are preserved deliberately (see `spec.md` §9):
//! `ident = value` does not require a prior `let`, and `range(...)` is
//! recognized by the identifier text `"range"`, not as a keyword.
//!
//! One quirk from the original is *not* preserved: there, a bare
//! `range(a, b)` used as a statement bypassed `ExprStmt` and so skipped
//! the trailing `POP`, leaking a value on the operand stack forever.
//! That's an accidental bug in the source, not a documented behavior —
//! here it's just an expression statement like any other call.

use crate::ast::{BinOp, Expr, Program, Stmt};
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_next(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        let tok = self.advance();
        if tok.kind != kind {
            return Err(CompileError::UnexpectedToken {
                expected: kind.to_string(),
                found: tok.to_string(),
            });
        }
        Ok(tok)
    }

    pub fn parse(mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::RBrace {
            statements.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(statements)
    }

    fn if_chain(&mut self) -> Result<Stmt, CompileError> {
        let mut branches = Vec::new();

        self.expect(TokenKind::If)?;
        let condition = self.expression()?;
        let body = self.block()?;
        branches.push((condition, body));

        while self.peek().kind == TokenKind::ElseIf {
            self.advance();
            let condition = self.expression()?;
            let body = self.block()?;
            branches.push((condition, body));
        }

        let else_body = if self.peek().kind == TokenKind::Else {
            self.advance();
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::If(branches, else_body))
    }

    fn while_statement(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // 'while'
        let condition = self.expression()?;
        let body = self.block()?;
        Ok(Stmt::While(condition, body))
    }

    fn for_in_loop(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // 'for'
        let var_tok = self.advance();
        if var_tok.kind != TokenKind::Ident {
            return Err(CompileError::ExpectedIdentifier { after: "for" });
        }
        let in_tok = self.advance();
        if in_tok.kind != TokenKind::In {
            return Err(CompileError::UnexpectedToken {
                expected: "in".to_string(),
                found: in_tok.to_string(),
            });
        }
        let iterable = self.expression()?;
        let body = self.block()?;
        Ok(Stmt::ForIn(var_tok.text, iterable, body))
    }

    fn function_def(&mut self) -> Result<Stmt, CompileError> {
        self.advance(); // 'fn'
        let name = self.advance().text;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            params.push(self.advance().text);
            while self.peek().kind == TokenKind::Comma {
                self.advance();
                params.push(self.advance().text);
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(Stmt::FunctionDef(name, params, body))
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        let tok = self.peek().clone();

        match tok.kind {
            TokenKind::ElseIf | TokenKind::Else => Err(CompileError::UnexpectedToken {
                expected: "statement".to_string(),
                found: tok.to_string(),
            }),

            TokenKind::Let => {
                self.advance();
                let name_tok = self.advance();
                if name_tok.kind != TokenKind::Ident {
                    return Err(CompileError::ExpectedIdentifier { after: "let" });
                }
                self.expect(TokenKind::Equal)?;
                let value = self.expression()?;
                Ok(Stmt::Let(name_tok.text, value))
            }

            TokenKind::Log => {
                self.advance();
                Ok(Stmt::Print(self.expression()?))
            }

            TokenKind::If => self.if_chain(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_in_loop(),
            TokenKind::Fn => self.function_def(),

            TokenKind::Return => {
                self.advance();
                let value = if self.peek().kind != TokenKind::RBrace {
                    Some(self.expression()?)
                } else {
                    None
                };
                Ok(Stmt::Return(value))
            }

            TokenKind::Break => {
                self.advance();
                Ok(Stmt::Break)
            }

            TokenKind::Continue => {
                self.advance();
                Ok(Stmt::Continue)
            }

            TokenKind::Ident if self.peek_next().kind == TokenKind::LBracket => {
                let target = self.primary()?;
                if self.peek().kind == TokenKind::Equal {
                    self.advance();
                    let value = self.expression()?;
                    match target {
                        Expr::Index(array, index) => Ok(Stmt::IndexAssign(*array, *index, value)),
                        other => Ok(Stmt::Expr(other)),
                    }
                } else {
                    Ok(Stmt::Expr(target))
                }
            }

            TokenKind::Ident if self.peek_next().kind == TokenKind::Equal => {
                let name = self.advance().text;
                self.advance(); // '='
                let value = self.expression()?;
                Ok(Stmt::Assign(name, value))
            }

            _ => Ok(Stmt::Expr(self.expression()?)),
        }
    }

    fn finish_call(&mut self, name: String) -> Result<Expr, CompileError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            args.push(self.expression()?);
            while self.peek().kind == TokenKind::Comma {
                self.advance();
                args.push(self.expression()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::Call(name, args))
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let tok = self.peek().clone();

        let mut expr = match tok.kind {
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if self.peek().kind != TokenKind::RBracket {
                    elements.push(self.expression()?);
                    while self.peek().kind == TokenKind::Comma {
                        self.advance();
                        elements.push(self.expression()?);
                    }
                }
                self.expect(TokenKind::RBracket)?;
                Expr::Array(elements)
            }

            TokenKind::Ident if tok.text == "range" => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let start = self.expression()?;
                self.expect(TokenKind::Comma)?;
                let end = self.expression()?;
                let step = if self.peek().kind == TokenKind::Comma {
                    self.advance();
                    Some(Box::new(self.expression()?))
                } else {
                    None
                };
                self.expect(TokenKind::RParen)?;
                Expr::Range(Box::new(start), Box::new(end), step)
            }

            TokenKind::True => {
                self.advance();
                Expr::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                Expr::Bool(false)
            }

            TokenKind::Ident => {
                self.advance();
                if self.peek().kind == TokenKind::LParen {
                    self.finish_call(tok.text)?
                } else {
                    Expr::Var(tok.text)
                }
            }

            TokenKind::Number => {
                self.advance();
                Expr::Number(tok.number)
            }

            TokenKind::Str => {
                self.advance();
                Expr::Str(tok.text)
            }

            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                inner
            }

            _ => {
                return Err(CompileError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: tok.to_string(),
                })
            }
        };

        loop {
            if self.peek().kind == TokenKind::LBracket {
                self.advance();
                let index = self.expression()?;
                self.expect(TokenKind::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
                continue;
            }
            break;
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        if self.peek().kind == TokenKind::Not {
            self.advance();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.peek().kind == TokenKind::Minus {
            self.advance();
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn factor(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gte => BinOp::Gte,
                TokenKind::Lte => BinOp::Lte,
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Neq,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.comparison()?;
        while matches!(self.peek().kind, TokenKind::And | TokenKind::AndAnd) {
            self.advance();
            let right = self.comparison()?;
            left = Expr::Binary(Box::new(left), BinOp::And, Box::new(right));
        }
        Ok(left)
    }

    fn or_expr(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.and_expr()?;
        while matches!(self.peek().kind, TokenKind::Or | TokenKind::OrOr) {
            self.advance();
            let right = self.and_expr()?;
            left = Expr::Binary(Box::new(left), BinOp::Or, Box::new(right));
        }
        Ok(left)
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.or_expr()
    }
}
