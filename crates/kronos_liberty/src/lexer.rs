//! Lexical analyzer for Liberty source text.
//!
//! Converts source text into a sequence of [`Token`]s, handling line and
//! block comments, quoted strings, numeric literals with exponents, and
//! backslash-newline continuations (used inside multi-line `values`
//! attributes). Tokens carry byte offsets into the source plus a 1-based
//! line number for diagnostics.

/// The kind of a Liberty token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LibertyToken {
    /// A bare identifier (group names, attribute names, enum-like values).
    Identifier,
    /// A numeric literal, possibly signed and with an exponent.
    Number,
    /// A double-quoted string; the token span excludes the quotes.
    QuotedString,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:`
    Colon,
    /// `;`
    Semi,
    /// `,`
    Comma,
    /// An unexpected byte.
    Error,
    /// End of input.
    Eof,
}

/// A token with its source span and line number.
#[derive(Clone, Copy, Debug)]
pub struct Token {
    /// The token kind.
    pub kind: LibertyToken,
    /// Byte offset of the token start.
    pub start: u32,
    /// Byte offset one past the token end.
    pub end: u32,
    /// 1-based line number of the token start.
    pub line: u32,
}

/// Lexes Liberty source text into a vector of tokens.
///
/// Whitespace, comments, and backslash-newline continuations are skipped.
/// The returned vector always ends with a [`LibertyToken::Eof`] token.
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
            self.skip_trivia();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: LibertyToken::Eof,
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

    fn skip_trivia(&mut self) {
        loop {
            // Whitespace
            while self.pos < self.source.len() && self.peek().is_ascii_whitespace() {
                self.bump();
            }
            if self.pos >= self.source.len() {
                return;
            }
            // Backslash-newline continuation
            if self.peek() == b'\\' && (self.peek_at(1) == b'\n' || self.peek_at(1) == b'\r') {
                self.bump();
                continue;
            }
            // Line comment: //
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.peek() != b'\n' {
                    self.bump();
                }
                continue;
            }
            // Block comment: /* ... */
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

        let kind = match b {
            b'(' => self.single(LibertyToken::LParen),
            b')' => self.single(LibertyToken::RParen),
            b'{' => self.single(LibertyToken::LBrace),
            b'}' => self.single(LibertyToken::RBrace),
            b':' => self.single(LibertyToken::Colon),
            b';' => self.single(LibertyToken::Semi),
            b',' => self.single(LibertyToken::Comma),
            b'"' => return self.lex_quoted_string(line),
            b if b.is_ascii_digit() || b == b'-' || b == b'+' => self.lex_number(),
            b if is_ident_start(b) => self.lex_identifier(),
            _ => self.single(LibertyToken::Error),
        };

        Token {
            kind,
            start: start as u32,
            end: self.pos as u32,
            line,
        }
    }

    fn single(&mut self, kind: LibertyToken) -> LibertyToken {
        self.bump();
        kind
    }

    fn lex_identifier(&mut self) -> LibertyToken {
        while self.pos < self.source.len() && is_ident_continue(self.peek()) {
            self.bump();
        }
        LibertyToken::Identifier
    }

    fn lex_number(&mut self) -> LibertyToken {
        self.bump();
        while self.pos < self.source.len() {
            let b = self.peek();
            if b.is_ascii_digit() || b == b'.' {
                self.bump();
            } else if (b == b'e' || b == b'E')
                && (self.peek_at(1).is_ascii_digit()
                    || ((self.peek_at(1) == b'-' || self.peek_at(1) == b'+')
                        && self.peek_at(2).is_ascii_digit()))
            {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        LibertyToken::Number
    }

    /// Lexes a quoted string; the token span covers the content only.
    fn lex_quoted_string(&mut self, line: u32) -> Token {
        self.bump(); // opening quote
        let start = self.pos;
        while self.pos < self.source.len() && self.peek() != b'"' {
            // Inside values strings a backslash-newline continues the string
            if self.peek() == b'\\' && self.peek_at(1) != 0 {
                self.bump();
            }
            self.bump();
        }
        let end = self.pos;
        let kind = if self.pos < self.source.len() {
            self.bump(); // closing quote
            LibertyToken::QuotedString
        } else {
            LibertyToken::Error
        };
        Token {
            kind,
            start: start as u32,
            end: end as u32,
            line,
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LibertyToken> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn text_of(source: &str, token: &Token) -> String {
        source[token.start as usize..token.end as usize].to_string()
    }

    #[test]
    fn punctuation_and_identifiers() {
        assert_eq!(
            kinds("pin (A) { }"),
            vec![
                LibertyToken::Identifier,
                LibertyToken::LParen,
                LibertyToken::Identifier,
                LibertyToken::RParen,
                LibertyToken::LBrace,
                LibertyToken::RBrace,
                LibertyToken::Eof,
            ]
        );
    }

    #[test]
    fn simple_attribute() {
        assert_eq!(
            kinds("capacitance : 0.0017;"),
            vec![
                LibertyToken::Identifier,
                LibertyToken::Colon,
                LibertyToken::Number,
                LibertyToken::Semi,
                LibertyToken::Eof,
            ]
        );
    }

    #[test]
    fn number_with_exponent() {
        let source = "1.5e-3";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, LibertyToken::Number);
        assert_eq!(text_of(source, &tokens[0]), "1.5e-3");
    }

    #[test]
    fn negative_number() {
        let source = "-0.25";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, LibertyToken::Number);
        assert_eq!(text_of(source, &tokens[0]), "-0.25");
    }

    #[test]
    fn quoted_string_excludes_quotes() {
        let source = "\"0.01, 0.2\"";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, LibertyToken::QuotedString);
        assert_eq!(text_of(source, &tokens[0]), "0.01, 0.2");
    }

    #[test]
    fn comments_skipped() {
        assert_eq!(
            kinds("/* header */ cell // trailing\n (X)"),
            vec![
                LibertyToken::Identifier,
                LibertyToken::LParen,
                LibertyToken::Identifier,
                LibertyToken::RParen,
                LibertyToken::Eof,
            ]
        );
    }

    #[test]
    fn backslash_continuation_skipped() {
        assert_eq!(
            kinds("values ( \"1, 2\", \\\n \"3, 4\" );"),
            vec![
                LibertyToken::Identifier,
                LibertyToken::LParen,
                LibertyToken::QuotedString,
                LibertyToken::Comma,
                LibertyToken::QuotedString,
                LibertyToken::RParen,
                LibertyToken::Semi,
                LibertyToken::Eof,
            ]
        );
    }

    #[test]
    fn line_numbers_advance() {
        let tokens = lex("a\nb\n\nc");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn unterminated_string_is_error() {
        let tokens = lex("\"abc");
        assert_eq!(tokens[0].kind, LibertyToken::Error);
    }

    #[test]
    fn identifier_with_dots() {
        let source = "sky130_fd_sc_hd__and2_1";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, LibertyToken::Identifier);
        assert_eq!(text_of(source, &tokens[0]), source);
    }
}
