//! Recursive-descent parser for the gate-level netlist subset.
//!
//! Accepts one `module` definition containing `input`/`output`/`wire`
//! declarations (with optional `[msb:lsb]` ranges, expanded per bit) and
//! named-port instances of library cells. Anything else at statement level
//! (e.g. `assign` tie-offs) is skipped to the next `;` with a warning.

use crate::ast::{Instance, Netlist, PortConnection};
use crate::lexer::lex;
use crate::preprocess::normalize_source;
use crate::token::{NetlistToken, Token};
use kronos_common::{Ident, Interner, StaError, StaResult};
use kronos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};

/// Parses netlist source text into a [`Netlist`].
///
/// The source is normalized (see [`normalize_source`]) before lexing, so
/// bit-selects and hierarchical names arrive as flat identifiers. `file`
/// names the input for diagnostics.
pub fn parse_netlist(
    source: &str,
    file: &str,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> StaResult<Netlist> {
    let normalized = normalize_source(source);
    let tokens = lex(&normalized);
    let mut parser = NetlistParser {
        tokens,
        pos: 0,
        source: &normalized,
        file,
        interner,
        sink,
    };
    parser.parse_module()
}

struct NetlistParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    file: &'src str,
    interner: &'src Interner,
    sink: &'src DiagnosticSink,
}

impl<'src> NetlistParser<'src> {
    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn current(&self) -> NetlistToken {
        self.tokens[self.pos].kind
    }

    fn current_text(&self) -> &'src str {
        let token = &self.tokens[self.pos];
        &self.source[token.start as usize..token.end as usize]
    }

    fn current_line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn at(&self, kind: NetlistToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.current() == NetlistToken::Eof
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: NetlistToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: NetlistToken, what: &str) -> StaResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self) -> StaResult<Ident> {
        if self.at(NetlistToken::Identifier) {
            let ident = self.interner.get_or_intern(self.current_text());
            self.advance();
            Ok(ident)
        } else {
            Err(self.error("expected identifier"))
        }
    }

    fn error(&self, message: &str) -> StaError {
        StaError::ParseError {
            file: self.file.to_string(),
            message: format!("{message} at line {}", self.current_line()),
        }
    }

    fn warn(&self, number: u16, message: String) {
        self.sink.emit(
            Diagnostic::warning(DiagnosticCode::new(Category::Netlist, number), message)
                .with_location(Location::new(self.file, self.current_line())),
        );
    }

    /// Skips tokens up to and including the next `;`.
    fn skip_statement(&mut self) {
        while !self.at_eof() && !self.eat(NetlistToken::Semi) {
            self.advance();
        }
    }

    // ========================================================================
    // Module structure
    // ========================================================================

    fn parse_module(&mut self) -> StaResult<Netlist> {
        self.expect(NetlistToken::Module, "'module'")?;
        let name = self.expect_ident()?;

        // Header port list: names only; directions come from the
        // declarations in the body.
        if self.eat(NetlistToken::LParen) {
            while !self.eat(NetlistToken::RParen) {
                if self.at_eof() {
                    return Err(self.error("unterminated module port list"));
                }
                self.advance();
            }
        }
        self.expect(NetlistToken::Semi, "';' after module header")?;

        let mut netlist = Netlist {
            name,
            inputs: Vec::new(),
            outputs: Vec::new(),
            wires: Vec::new(),
            instances: Vec::new(),
        };

        loop {
            match self.current() {
                NetlistToken::Endmodule => {
                    self.advance();
                    break;
                }
                NetlistToken::Eof => return Err(self.error("expected 'endmodule'")),
                NetlistToken::Input => {
                    self.advance();
                    let nets = self.parse_net_declaration()?;
                    netlist.inputs.extend(nets);
                }
                NetlistToken::Output => {
                    self.advance();
                    let nets = self.parse_net_declaration()?;
                    netlist.outputs.extend(nets);
                }
                NetlistToken::Wire => {
                    self.advance();
                    let nets = self.parse_net_declaration()?;
                    netlist.wires.extend(nets);
                }
                NetlistToken::Identifier => {
                    let instance = self.parse_instance()?;
                    netlist.instances.push(instance);
                }
                _ => {
                    self.warn(1, format!("skipping unrecognized statement starting with `{}`", self.current_text()));
                    self.skip_statement();
                }
            }
        }

        Ok(netlist)
    }

    /// Parses the tail of a net declaration after its direction keyword:
    /// `[msb:lsb]? name (, name)* ;`, expanding ranges per bit.
    fn parse_net_declaration(&mut self) -> StaResult<Vec<Ident>> {
        let range = if self.eat(NetlistToken::LBracket) {
            let msb = self.parse_index()?;
            self.expect(NetlistToken::Colon, "':' in range")?;
            let lsb = self.parse_index()?;
            self.expect(NetlistToken::RBracket, "']' closing range")?;
            Some((msb, lsb))
        } else {
            None
        };

        let mut nets = Vec::new();
        loop {
            if !self.at(NetlistToken::Identifier) {
                return Err(self.error("expected net name"));
            }
            let base = self.current_text().to_string();
            self.advance();
            match range {
                Some((msb, lsb)) => {
                    let (lo, hi) = if msb >= lsb { (lsb, msb) } else { (msb, lsb) };
                    for bit in lo..=hi {
                        nets.push(self.interner.get_or_intern(&format!("{base}__{bit}")));
                    }
                }
                None => nets.push(self.interner.get_or_intern(&base)),
            }
            if !self.eat(NetlistToken::Comma) {
                break;
            }
        }
        self.expect(NetlistToken::Semi, "';' after net declaration")?;
        Ok(nets)
    }

    fn parse_index(&mut self) -> StaResult<u32> {
        if self.at(NetlistToken::Number) {
            let value = self
                .current_text()
                .parse()
                .map_err(|_| self.error("malformed range bound"))?;
            self.advance();
            Ok(value)
        } else {
            Err(self.error("expected range bound"))
        }
    }

    /// Parses a cell instance: `CELL inst ( .PIN(net), ... ) ;`.
    fn parse_instance(&mut self) -> StaResult<Instance> {
        let cell = self.expect_ident()?;
        let name = self.expect_ident()?;
        self.expect(NetlistToken::LParen, "'(' opening port connections")?;

        let mut connections = Vec::new();
        while !self.eat(NetlistToken::RParen) {
            if self.at_eof() {
                return Err(self.error("unterminated port connection list"));
            }
            if self.eat(NetlistToken::Comma) {
                continue;
            }
            self.expect(NetlistToken::Dot, "'.' introducing a port connection")?;
            let pin = self.expect_ident()?;
            self.expect(NetlistToken::LParen, "'(' after pin name")?;
            match self.current() {
                NetlistToken::Identifier => {
                    let net = self.interner.get_or_intern(self.current_text());
                    self.advance();
                    connections.push(PortConnection { pin, net });
                }
                NetlistToken::BasedLiteral => {
                    // Constant tie-off: no timing contribution, binding kept
                    // so the pin is not reported as dangling.
                    let net = self.interner.get_or_intern(self.current_text());
                    self.advance();
                    connections.push(PortConnection { pin, net });
                }
                NetlistToken::RParen => {
                    // Explicitly unconnected pin: .PIN()
                    self.warn(2, "unconnected port binding".to_string());
                }
                _ => return Err(self.error("expected net in port connection")),
            }
            self.expect(NetlistToken::RParen, "')' closing port connection")?;
        }
        self.expect(NetlistToken::Semi, "';' after instance")?;

        Ok(Instance {
            name,
            cell,
            connections,
        })
    }
}
