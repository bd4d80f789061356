//! # Rayvn Lexer
//!
//! Source text → flat token stream, ported from
//! `original_source/compiler/lexer.py` into idiomatic Rust. The one
//! quirk worth calling out: the single-line comment marker `**` and the
//! block comment opener `***` share a prefix, so the block form is
//! checked first at every position — a one-character lookahead decides
//! which one a run of `*` actually is.
//!
//! Strings are double-quoted with no escape processing; a backslash
//! inside a string is an ordinary character, not an escape introducer.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Let,
    Fn,
    If,
    ElseIf,
    Else,
    Log,
    While,
    For,
    In,
    Break,
    Continue,
    Return,
    True,
    False,
    And,
    Or,
    Not,
    Ident,
    Number,
    Str,
    Equal,
    EqEq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Plus,
    Minus,
    Star,
    Slash,
    AndAnd,
    OrOr,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A lexical token. `Ident`/`Str` carry their text in `text`; `Number`
/// carries its parsed value in `number`.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub number: i64,
}

impl Token {
    fn simple(kind: TokenKind) -> Self {
        Token {
            kind,
            text: String::new(),
            number: 0,
        }
    }

    fn ident(kind: TokenKind, text: String) -> Self {
        Token {
            kind,
            text,
            number: 0,
        }
    }

    fn num(value: i64) -> Self {
        Token {
            kind: TokenKind::Number,
            text: String::new(),
            number: value,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Str => write!(f, "{}:{}", self.kind, self.text),
            TokenKind::Number => write!(f, "{}:{}", self.kind, self.number),
            _ => write!(f, "{}", self.kind),
        }
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "let" => Let,
        "fn" => Fn,
        "if" => If,
        "elseif" => ElseIf,
        "else" => Else,
        "while" => While,
        "for" => For,
        "in" => In,
        "log" => Log,
        "true" => True,
        "false" => False,
        "return" => Return,
        "break" => Break,
        "continue" => Continue,
        "and" => And,
        "or" => Or,
        "not" => Not,
        _ => return None,
    })
}

use crate::error::CompileError;

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> u8 {
        *self.src.get(self.pos).unwrap_or(&0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        *self.src.get(self.pos + offset).unwrap_or(&0)
    }

    fn advance(&mut self) -> u8 {
        let ch = self.peek();
        self.pos += 1;
        ch
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        while self.peek() != 0 {
            let c = self.peek();

            if c.is_ascii_whitespace() {
                self.advance();
                continue;
            }

            if c.is_ascii_alphabetic() || c == b'_' {
                let start = self.pos;
                while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
                    self.advance();
                }
                let ident = std::str::from_utf8(&self.src[start..self.pos]).unwrap().to_string();
                match keyword(&ident) {
                    Some(kind) => tokens.push(Token::ident(kind, ident)),
                    None => tokens.push(Token::ident(TokenKind::Ident, ident)),
                }
                continue;
            }

            if c.is_ascii_digit() {
                let start = self.pos;
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
                let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
                tokens.push(Token::num(text.parse().expect("digit run parses as i64")));
                continue;
            }

            // Block comment `***...***` is checked before the single-line
            // `**` marker so the longer form always wins.
            if c == b'*' && self.peek_at(1) == b'*' && self.peek_at(2) == b'*' {
                self.advance();
                self.advance();
                self.advance();
                loop {
                    if self.peek() == 0 {
                        return Err(CompileError::UnterminatedBlockComment);
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'*' && self.peek_at(2) == b'*' {
                        break;
                    }
                    self.advance();
                }
                self.advance();
                self.advance();
                self.advance();
                continue;
            }

            if c == b'*' && self.peek_at(1) == b'*' {
                self.advance();
                self.advance();
                while self.peek() != b'\n' && self.peek() != 0 {
                    self.advance();
                }
                continue;
            }

            if c == b'=' && self.peek_at(1) == b'=' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::EqEq));
                continue;
            }
            if c == b'!' && self.peek_at(1) == b'=' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::NotEq));
                continue;
            }
            if c == b'>' && self.peek_at(1) == b'=' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::Gte));
                continue;
            }
            if c == b'<' && self.peek_at(1) == b'=' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::Lte));
                continue;
            }
            if c == b'&' && self.peek_at(1) == b'&' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::AndAnd));
                continue;
            }
            if c == b'|' && self.peek_at(1) == b'|' {
                self.advance();
                self.advance();
                tokens.push(Token::simple(TokenKind::OrOr));
                continue;
            }

            if c == b'"' {
                self.advance();
                let start = self.pos;
                while self.peek() != b'"' {
                    if self.peek() == 0 {
                        return Err(CompileError::UnterminatedString);
                    }
                    self.advance();
                }
                let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap().to_string();
                self.advance();
                tokens.push(Token::ident(TokenKind::Str, text));
                continue;
            }

            let single = match c {
                b'=' => Some(TokenKind::Equal),
                b'+' => Some(TokenKind::Plus),
                b'-' => Some(TokenKind::Minus),
                b'*' => Some(TokenKind::Star),
                b'/' => Some(TokenKind::Slash),
                b'(' => Some(TokenKind::LParen),
                b')' => Some(TokenKind::RParen),
                b'{' => Some(TokenKind::LBrace),
                b'}' => Some(TokenKind::RBrace),
                b'[' => Some(TokenKind::LBracket),
                b']' => Some(TokenKind::RBracket),
                b',' => Some(TokenKind::Comma),
                b'>' => Some(TokenKind::Gt),
                b'<' => Some(TokenKind::Lt),
                b'!' => Some(TokenKind::Not),
                _ => None,
            };

            if let Some(kind) = single {
                tokens.push(Token::simple(kind));
                self.advance();
                continue;
            }

            return Err(CompileError::UnexpectedChar(c as char));
        }

        tokens.push(Token::simple(TokenKind::Eof));
        Ok(tokens)
    }
}
