//! Recursive-descent parser for Liberty group/attribute syntax.
//!
//! Builds the typed [`Library`] model from a token stream. Only the groups
//! and attributes the timing engine consumes are materialized (`cell`,
//! `pin`, `timing`, and the delay/transition/constraint tables); everything
//! else (templates, power groups, `ff` groups, operating conditions) is
//! skipped with balanced-brace recovery. Structural errors (unbalanced
//! groups, malformed attribute values) are fatal and surface as
//! [`StaError::ParseError`]; recoverable oddities are reported to the
//! [`DiagnosticSink`] as warnings.

use crate::lexer::{lex, LibertyToken, Token};
use crate::model::{Cell, Library, Pin, PinDirection, TimingArc, TimingSense, TimingType};
use crate::table::{LookupTable, TableKind};
use kronos_common::{Ident, Interner, StaError, StaResult};
use kronos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};

/// Parses Liberty source text into a [`Library`].
///
/// `file` names the input for diagnostics. Cell, pin, and related-pin names
/// are interned via `interner`; warnings (unknown `timing_type` values,
/// arcs without a `related_pin`) are emitted to `sink`.
pub fn parse_library(
    source: &str,
    file: &str,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> StaResult<Library> {
    let tokens = lex(source);
    let mut parser = LibertyParser {
        tokens,
        pos: 0,
        source,
        file,
        interner,
        sink,
    };
    parser.parse_library()
}

/// A statement header inside a Liberty group body.
enum Stmt {
    /// `name : value ;`
    Simple { name: String, value: String },
    /// `name ( args ) ;`
    Complex { name: String, args: Vec<String> },
    /// `name ( args ) { ...` — the parser is positioned just after the `{`.
    Group { name: String, args: Vec<String> },
}

struct LibertyParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    file: &'src str,
    interner: &'src Interner,
    sink: &'src DiagnosticSink,
}

impl<'src> LibertyParser<'src> {
    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn current(&self) -> LibertyToken {
        self.tokens[self.pos].kind
    }

    fn current_text(&self) -> &'src str {
        let token = &self.tokens[self.pos];
        &self.source[token.start as usize..token.end as usize]
    }

    fn current_line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn at(&self, kind: LibertyToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.current() == LibertyToken::Eof
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: LibertyToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: LibertyToken, what: &str) -> StaResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
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
            Diagnostic::warning(DiagnosticCode::new(Category::Liberty, number), message)
                .with_location(Location::new(self.file, self.current_line())),
        );
    }

    // ========================================================================
    // Statement dispatch
    // ========================================================================

    /// Parses the header of the next statement inside a group body.
    ///
    /// For `Stmt::Group` the parser stops just after the opening `{`; the
    /// caller either parses the body or skips it with [`skip_group_body`].
    fn parse_stmt(&mut self) -> StaResult<Stmt> {
        if !self.at(LibertyToken::Identifier) {
            return Err(self.error("expected attribute or group name"));
        }
        let name = self.current_text().to_string();
        self.advance();

        if self.eat(LibertyToken::Colon) {
            let value = self.parse_attr_value()?;
            self.expect(LibertyToken::Semi, "';' after attribute value")?;
            return Ok(Stmt::Simple { name, value });
        }

        self.expect(LibertyToken::LParen, "':' or '(' after name")?;
        let args = self.parse_args()?;
        if self.eat(LibertyToken::LBrace) {
            Ok(Stmt::Group { name, args })
        } else {
            // Trailing ';' after complex attributes is conventional but not
            // universal in the wild.
            self.eat(LibertyToken::Semi);
            Ok(Stmt::Complex { name, args })
        }
    }

    fn parse_attr_value(&mut self) -> StaResult<String> {
        match self.current() {
            LibertyToken::Identifier | LibertyToken::Number | LibertyToken::QuotedString => {
                let value = self.current_text().to_string();
                self.advance();
                Ok(value)
            }
            _ => Err(self.error("expected attribute value")),
        }
    }

    fn parse_args(&mut self) -> StaResult<Vec<String>> {
        let mut args = Vec::new();
        while !self.at(LibertyToken::RParen) {
            if self.at_eof() {
                return Err(self.error("unterminated argument list"));
            }
            match self.current() {
                LibertyToken::Identifier | LibertyToken::Number | LibertyToken::QuotedString => {
                    args.push(self.current_text().to_string());
                    self.advance();
                }
                LibertyToken::Comma => self.advance(),
                _ => return Err(self.error("unexpected token in argument list")),
            }
        }
        self.advance(); // ')'
        Ok(args)
    }

    /// Skips a group body whose opening `{` has been consumed, balancing
    /// nested braces.
    fn skip_group_body(&mut self) -> StaResult<()> {
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_eof() {
                return Err(self.error("unterminated group"));
            }
            match self.current() {
                LibertyToken::LBrace => depth += 1,
                LibertyToken::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    // ========================================================================
    // Library structure
    // ========================================================================

    fn parse_library(&mut self) -> StaResult<Library> {
        if !(self.at(LibertyToken::Identifier) && self.current_text() == "library") {
            return Err(self.error("expected 'library' group"));
        }
        self.advance();
        self.expect(LibertyToken::LParen, "'(' after 'library'")?;
        let args = self.parse_args()?;
        let name = args.first().cloned().unwrap_or_default();
        self.expect(LibertyToken::LBrace, "'{' opening the library body")?;

        let mut library = Library::new(self.interner.get_or_intern(&name));
        while !self.eat(LibertyToken::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated library group"));
            }
            match self.parse_stmt()? {
                Stmt::Group { name, args } if name == "cell" => {
                    let cell = self.parse_cell(args)?;
                    library.cells.insert(cell.name, cell);
                }
                Stmt::Group { .. } => self.skip_group_body()?,
                Stmt::Simple { .. } | Stmt::Complex { .. } => {}
            }
        }
        Ok(library)
    }

    fn parse_cell(&mut self, args: Vec<String>) -> StaResult<Cell> {
        let name = args
            .first()
            .ok_or_else(|| self.error("cell group without a name"))?;
        let mut cell = Cell {
            name: self.interner.get_or_intern(name),
            pins: Vec::new(),
        };

        while !self.eat(LibertyToken::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated cell group"));
            }
            match self.parse_stmt()? {
                Stmt::Group { name, args } if name == "pin" => {
                    let pin = self.parse_pin(args)?;
                    cell.pins.push(pin);
                }
                Stmt::Group { .. } => self.skip_group_body()?,
                Stmt::Simple { .. } | Stmt::Complex { .. } => {}
            }
        }
        Ok(cell)
    }

    fn parse_pin(&mut self, args: Vec<String>) -> StaResult<Pin> {
        let name = args
            .first()
            .ok_or_else(|| self.error("pin group without a name"))?;
        let mut pin = Pin {
            name: self.interner.get_or_intern(name),
            direction: PinDirection::Internal,
            capacitance: 0.0,
            arcs: Vec::new(),
        };
        let mut is_clock = false;

        while !self.eat(LibertyToken::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated pin group"));
            }
            match self.parse_stmt()? {
                Stmt::Simple { name, value } => match name.as_str() {
                    "direction" => {
                        pin.direction = match value.as_str() {
                            "input" => PinDirection::Input,
                            "output" => PinDirection::Output,
                            "internal" => PinDirection::Internal,
                            other => {
                                self.warn(1, format!("unknown pin direction `{other}`"));
                                PinDirection::Internal
                            }
                        };
                    }
                    "capacitance" => {
                        pin.capacitance = self.parse_number(&value)?;
                    }
                    "clock" => {
                        is_clock = value == "true";
                    }
                    _ => {}
                },
                Stmt::Group { name, .. } if name == "timing" => {
                    if let Some(arc) = self.parse_timing()? {
                        pin.arcs.push(arc);
                    }
                }
                Stmt::Group { .. } => self.skip_group_body()?,
                Stmt::Complex { .. } => {}
            }
        }

        if is_clock && pin.direction == PinDirection::Input {
            pin.direction = PinDirection::Clock;
        }
        Ok(pin)
    }

    /// Parses a `timing () { ... }` group into an arc.
    ///
    /// Returns `None` (with a warning) for arcs the engine cannot use:
    /// unknown `timing_type` values and arcs without a `related_pin`.
    fn parse_timing(&mut self) -> StaResult<Option<TimingArc>> {
        let mut related_pin: Option<Ident> = None;
        let mut timing_type = TimingType::Combinational;
        let mut timing_sense = TimingSense::NonUnate;
        let mut tables = Vec::new();
        let mut known_type = true;

        while !self.eat(LibertyToken::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated timing group"));
            }
            match self.parse_stmt()? {
                Stmt::Simple { name, value } => match name.as_str() {
                    "related_pin" => {
                        related_pin = Some(self.interner.get_or_intern(value.trim_matches('"')));
                    }
                    "timing_type" => match TimingType::from_attr(&value) {
                        Some(t) => timing_type = t,
                        None => {
                            self.warn(2, format!("unsupported timing_type `{value}`, arc skipped"));
                            known_type = false;
                        }
                    },
                    "timing_sense" => match TimingSense::from_attr(&value) {
                        Some(s) => timing_sense = s,
                        None => {
                            self.warn(3, format!("unknown timing_sense `{value}`"));
                        }
                    },
                    _ => {}
                },
                Stmt::Group { name, .. } => match TableKind::from_group_name(&name) {
                    Some(kind) => {
                        let table = self.parse_table()?;
                        tables.push((kind, table));
                    }
                    None => self.skip_group_body()?,
                },
                Stmt::Complex { .. } => {}
            }
        }

        if !known_type {
            return Ok(None);
        }
        let Some(related_pin) = related_pin else {
            self.warn(4, "timing group without related_pin, arc skipped".to_string());
            return Ok(None);
        };
        Ok(Some(TimingArc {
            related_pin,
            timing_type,
            timing_sense,
            tables,
        }))
    }

    /// Parses a table group body (`index_1`, `index_2`, `values`) whose
    /// opening `{` has been consumed.
    fn parse_table(&mut self) -> StaResult<LookupTable> {
        let mut index_1 = Vec::new();
        let mut index_2 = Vec::new();
        let mut flat_values = Vec::new();

        while !self.eat(LibertyToken::RBrace) {
            if self.at_eof() {
                return Err(self.error("unterminated table group"));
            }
            match self.parse_stmt()? {
                Stmt::Complex { name, args } => match name.as_str() {
                    "index_1" => index_1 = self.parse_number_list(&args)?,
                    "index_2" => index_2 = self.parse_number_list(&args)?,
                    "values" => flat_values = self.parse_number_list(&args)?,
                    _ => {}
                },
                Stmt::Group { .. } => self.skip_group_body()?,
                Stmt::Simple { .. } => {}
            }
        }

        // A one-dimensional characterization leaves index_2 empty; model it
        // as a single-sample second axis so interpolation collapses to 1-D.
        if index_2.is_empty() && !index_1.is_empty() {
            index_2 = vec![0.0];
        }
        if index_1.is_empty() || index_2.is_empty() {
            return Err(self.error("table group without index axes"));
        }
        if flat_values.len() != index_1.len() * index_2.len() {
            return Err(self.error(&format!(
                "table has {} values, expected {}",
                flat_values.len(),
                index_1.len() * index_2.len()
            )));
        }
        let values = flat_values
            .chunks(index_2.len())
            .map(|row| row.to_vec())
            .collect();
        Ok(LookupTable::new(index_1, index_2, values)?)
    }

    fn parse_number(&self, text: &str) -> StaResult<f64> {
        text.trim_matches('"')
            .trim()
            .parse()
            .map_err(|_| self.error(&format!("malformed number `{text}`")))
    }

    /// Flattens a list of argument strings (each possibly a comma-separated
    /// quoted list) into a vector of floats.
    fn parse_number_list(&self, args: &[String]) -> StaResult<Vec<f64>> {
        let mut numbers = Vec::new();
        for arg in args {
            for piece in arg.split(',') {
                let piece = piece.trim().trim_matches('\\').trim();
                if piece.is_empty() {
                    continue;
                }
                numbers.push(self.parse_number(piece)?);
            }
        }
        Ok(numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArcFilter, Transition};

    const LIB: &str = r#"
library (testlib) {
  time_unit : "1ns";
  lu_table_template (delay_template_2x2) {
    variable_1 : input_net_transition;
    variable_2 : total_output_net_capacitance;
    index_1 ("0.01, 0.2");
    index_2 ("0.0005, 0.05");
  }
  cell (AND2) {
    area : 2.5;
    pin (A) {
      direction : input;
      capacitance : 0.0017;
    }
    pin (B) {
      direction : input;
      capacitance : 0.0019;
    }
    pin (Y) {
      direction : output;
      timing () {
        related_pin : "A";
        timing_sense : positive_unate;
        cell_rise (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.1, 0.2", \
                  "0.3, 0.4");
        }
        rise_transition (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.01, 0.02", "0.03, 0.04");
        }
        cell_fall (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.15, 0.25", "0.35, 0.45");
        }
        fall_transition (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.011, 0.021", "0.031, 0.041");
        }
      }
    }
  }
  cell (DFRTP) {
    ff (IQ, IQ_N) {
      clocked_on : "CLK";
      next_state : "D";
    }
    pin (CLK) {
      direction : input;
      clock : true;
      capacitance : 0.001;
    }
    pin (D) {
      direction : input;
      capacitance : 0.002;
      timing () {
        related_pin : "CLK";
        timing_type : setup_rising;
        rise_constraint (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.05, 0.06", "0.07, 0.08");
        }
        fall_constraint (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.04, 0.05", "0.06, 0.07");
        }
      }
      timing () {
        related_pin : "CLK";
        timing_type : hold_rising;
        rise_constraint (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("-0.01, -0.02", "-0.03, -0.04");
        }
        fall_constraint (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("-0.02, -0.03", "-0.04, -0.05");
        }
      }
    }
    pin (Q) {
      direction : output;
      timing () {
        related_pin : "CLK";
        timing_type : rising_edge;
        cell_rise (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.2, 0.3", "0.4, 0.5");
        }
        rise_transition (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.02, 0.03", "0.04, 0.05");
        }
        cell_fall (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.25, 0.35", "0.45, 0.55");
        }
        fall_transition (delay_template_2x2) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.025, 0.035", "0.045, 0.055");
        }
      }
    }
  }
}
"#;

    fn parse(source: &str) -> (Library, Interner, DiagnosticSink) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let library = parse_library(source, "test.lib", &interner, &sink).unwrap();
        (library, interner, sink)
    }

    #[test]
    fn parses_cells_and_pins() {
        let (library, interner, sink) = parse(LIB);
        assert_eq!(library.cell_count(), 2);
        assert!(!sink.has_errors());

        let and2 = library.cell(interner.get_or_intern("AND2")).unwrap();
        assert_eq!(and2.pins.len(), 3);
        let a = and2.pin(interner.get_or_intern("A")).unwrap();
        assert_eq!(a.direction, PinDirection::Input);
        assert_eq!(a.capacitance, 0.0017);
    }

    #[test]
    fn clock_attribute_promotes_direction() {
        let (library, interner, _) = parse(LIB);
        let dfrtp = library.cell(interner.get_or_intern("DFRTP")).unwrap();
        let clk = dfrtp.pin(interner.get_or_intern("CLK")).unwrap();
        assert_eq!(clk.direction, PinDirection::Clock);
        assert!(clk.direction.is_input());
    }

    #[test]
    fn combinational_arc_with_tables() {
        let (library, interner, _) = parse(LIB);
        let and2 = library.cell(interner.get_or_intern("AND2")).unwrap();
        let arc = and2
            .arc(
                interner.get_or_intern("Y"),
                interner.get_or_intern("A"),
                ArcFilter::Combinational,
            )
            .unwrap();
        assert_eq!(arc.timing_sense, TimingSense::PositiveUnate);
        assert!(arc.has_delay_tables(Transition::Rise));
        assert!(arc.has_delay_tables(Transition::Fall));

        let cell_rise = arc.table(TableKind::CellRise).unwrap();
        assert_eq!(cell_rise.index_1, vec![0.01, 0.2]);
        assert_eq!(cell_rise.values[1][0], 0.3);
    }

    #[test]
    fn setup_and_hold_arcs_separate() {
        let (library, interner, _) = parse(LIB);
        let dfrtp = library.cell(interner.get_or_intern("DFRTP")).unwrap();
        let d = interner.get_or_intern("D");
        let clk = interner.get_or_intern("CLK");

        let setup = dfrtp.arc(d, clk, ArcFilter::Setup).unwrap();
        assert_eq!(setup.timing_type, TimingType::SetupRising);
        assert!(setup.table(TableKind::RiseConstraint).is_some());
        assert!(setup.table(TableKind::FallConstraint).is_some());

        let hold = dfrtp.arc(d, clk, ArcFilter::Hold).unwrap();
        assert_eq!(hold.timing_type, TimingType::HoldRising);
        assert_eq!(hold.table(TableKind::RiseConstraint).unwrap().values[0][0], -0.01);
    }

    #[test]
    fn clock_edge_arc_on_q() {
        let (library, interner, _) = parse(LIB);
        let dfrtp = library.cell(interner.get_or_intern("DFRTP")).unwrap();
        let arc = dfrtp
            .any_arc(interner.get_or_intern("Q"), ArcFilter::ClockEdge)
            .unwrap();
        assert_eq!(arc.timing_type, TimingType::RisingEdge);
        assert_eq!(arc.related_pin, interner.get_or_intern("CLK"));
    }

    #[test]
    fn delay_and_transition_tables_share_axes() {
        let (library, _, _) = parse(LIB);
        for cell in library.cells.values() {
            for pin in &cell.pins {
                for arc in &pin.arcs {
                    let pairs = [
                        (TableKind::CellRise, TableKind::RiseTransition),
                        (TableKind::CellFall, TableKind::FallTransition),
                    ];
                    for (delay_kind, transition_kind) in pairs {
                        if let (Some(delay), Some(transition)) =
                            (arc.table(delay_kind), arc.table(transition_kind))
                        {
                            assert_eq!(delay.index_1, transition.index_1);
                            assert_eq!(delay.index_2, transition.index_2);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn unknown_groups_skipped() {
        let (library, _, sink) = parse(LIB);
        // lu_table_template and ff groups are skipped without diagnostics
        assert_eq!(library.cell_count(), 2);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn unsupported_timing_type_warns_and_skips() {
        let source = r#"
library (l) {
  cell (TBUF) {
    pin (Y) {
      direction : output;
      timing () {
        related_pin : "EN";
        timing_type : three_state_enable;
      }
    }
  }
}
"#;
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let library = parse_library(source, "t.lib", &interner, &sink).unwrap();
        let tbuf = library.cell(interner.get_or_intern("TBUF")).unwrap();
        assert!(tbuf.pin(interner.get_or_intern("Y")).unwrap().arcs.is_empty());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn missing_related_pin_warns_and_skips() {
        let source = r#"
library (l) {
  cell (C) {
    pin (Y) {
      direction : output;
      timing () {
        timing_sense : positive_unate;
      }
    }
  }
}
"#;
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let library = parse_library(source, "t.lib", &interner, &sink).unwrap();
        let c = library.cell(interner.get_or_intern("C")).unwrap();
        assert!(c.pin(interner.get_or_intern("Y")).unwrap().arcs.is_empty());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn unterminated_group_is_fatal() {
        let source = "library (l) { cell (C) {";
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let err = parse_library(source, "t.lib", &interner, &sink).unwrap_err();
        assert!(format!("{err}").contains("unterminated"));
    }

    #[test]
    fn value_count_mismatch_is_fatal() {
        let source = r#"
library (l) {
  cell (C) {
    pin (Y) {
      direction : output;
      timing () {
        related_pin : "A";
        cell_rise (t) {
          index_1 ("0.01, 0.2");
          index_2 ("0.0005, 0.05");
          values ("0.1, 0.2, 0.3");
        }
      }
    }
  }
}
"#;
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let err = parse_library(source, "t.lib", &interner, &sink).unwrap_err();
        assert!(format!("{err}").contains("expected 4"));
    }
}
