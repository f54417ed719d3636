//! Lexical analyzer for the gate-level netlist subset.
//!
//! Converts normalized source text (see [`crate::preprocess`]) into a
//! sequence of [`Token`]s, handling line and block comments, based literals
//! (`1'b0`), and the punctuation used by structural module bodies.

use crate::token::{lookup_keyword, NetlistToken, Token};

/// Lexes netlist source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends
/// with a [`NetlistToken::Eof`] token.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        line: 1,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: NetlistToken::Eof,
                    start: self.pos as u32,
                    end: self.pos as u32,
                    line: self.line,
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.source.len() {
            self.source[idx]
        } else {
            0
        }
    }

    fn bump(&mut self) {
        if self.source[self.pos] == b'\n' {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.peek().is_ascii_whitespace() {
                self.bump();
            }
            if self.pos >= self.source.len() {
                return;
            }
            // Line comment: //
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.peek() != b'\n' {
                    self.bump();
                }
                continue;
            }
            // Block comment: /* ... */ (non-nesting)
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                self.bump();
                self.bump();
                while self.pos < self.source.len() {
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let line = self.line;
        let b = self.peek();

        let kind = if is_ident_start(b) {
            while self.pos < self.source.len() && is_ident_continue(self.peek()) {
                self.bump();
            }
            let text = &self.source[start..self.pos];
            lookup_keyword(std::str::from_utf8(text).unwrap_or(""))
                .unwrap_or(NetlistToken::Identifier)
        } else if b.is_ascii_digit() {
            self.lex_number_or_literal()
        } else {
            let kind = match b {
                b'(' => NetlistToken::LParen,
                b')' => NetlistToken::RParen,
                b'[' => NetlistToken::LBracket,
                b']' => NetlistToken::RBracket,
                b';' => NetlistToken::Semi,
                b',' => NetlistToken::Comma,
                b'.' => NetlistToken::Dot,
                b':' => NetlistToken::Colon,
                _ => NetlistToken::Error,
            };
            self.bump();
            kind
        };

        Token {
            kind,
            start: start as u32,
            end: self.pos as u32,
            line,
        }
    }

    /// Lexes either a plain decimal number or a based literal (`4'b1010`).
    fn lex_number_or_literal(&mut self) -> NetlistToken {
        while self.pos < self.source.len() && self.peek().is_ascii_digit() {
            self.bump();
        }
        if self.peek() == b'\'' {
            self.bump();
            while self.pos < self.source.len() && self.peek().is_ascii_alphanumeric() {
                self.bump();
            }
            NetlistToken::BasedLiteral
        } else {
            NetlistToken::Number
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
