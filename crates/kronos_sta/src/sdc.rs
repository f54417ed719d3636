//! SDC timing constraint file parser.
//!
//! Parses the Synopsys Design Constraints subset driving the analysis:
//!
//! - `create_clock` — clock name and period
//! - `set_clock_transition` — clock slew, also used for constraint lookups
//! - `set_clock_uncertainty -setup|-hold` — cycle margin
//! - `set_input_delay` / `set_output_delay` — boundary delays
//! - `set_load <value> [all_outputs]` — primary-output load
//! - `set_timing_derate -early|-late` — global derates
//!
//! The parser is line-based (one command per line, backslash continuation
//! supported) and does not attempt full Tcl interpretation. Unrecognized
//! commands are reported as warnings and skipped.

use crate::constraints::{
    DelayBound, DerateBound, IoDelay, IoDelayKind, SdcConstraints, TimingDerate,
};
use kronos_common::Interner;
use kronos_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};

/// Parses SDC source text into an [`SdcConstraints`] structure.
///
/// Lines starting with `#` are comments. Parse problems within recognized
/// commands are reported as warnings and the command keeps its default.
pub fn parse_sdc(
    source: &str,
    file: &str,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> SdcConstraints {
    let mut constraints = SdcConstraints::new();

    let joined = join_continuation_lines(source);

    for (line_no, line) in joined.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let warn = |number: u16, message: String| {
            sink.emit(
                Diagnostic::warning(DiagnosticCode::new(Category::Sdc, number), message)
                    .with_location(Location::new(file, line_no as u32 + 1)),
            );
        };

        let tokens: Vec<&str> = tokenize_sdc_line(trimmed);
        if tokens.is_empty() {
            continue;
        }

        match tokens[0] {
            "create_clock" => {
                parse_create_clock(&tokens[1..], interner, &warn, &mut constraints);
            }
            "set_clock_transition" => {
                match tokens[1..].iter().find_map(|t| t.parse::<f64>().ok()) {
                    Some(value) => constraints.clock_transition = value,
                    None => warn(2, "set_clock_transition: missing value".to_string()),
                }
            }
            "set_clock_uncertainty" => {
                parse_clock_uncertainty(&tokens[1..], &warn, &mut constraints);
            }
            "set_input_delay" => {
                parse_io_delay(&tokens[1..], interner, &warn, &mut constraints, IoDelayKind::Input);
            }
            "set_output_delay" => {
                parse_io_delay(&tokens[1..], interner, &warn, &mut constraints, IoDelayKind::Output);
            }
            "set_load" => {
                parse_set_load(&tokens[1..], &warn, &mut constraints);
            }
            "set_timing_derate" => {
                parse_timing_derate(&tokens[1..], &warn, &mut constraints);
            }
            cmd => {
                warn(1, format!("unrecognized SDC command: `{cmd}`"));
            }
        }
    }

    constraints
}

/// Folds backslash-continued physical lines into logical lines, so each
/// command occupies exactly one line of the result.
fn join_continuation_lines(source: &str) -> String {
    let mut logical = String::with_capacity(source.len());
    for line in source.lines() {
        let line = line.trim_end();
        match line.strip_suffix('\\') {
            Some(head) => {
                logical.push_str(head);
                logical.push(' ');
            }
            None => {
                logical.push_str(line);
                logical.push('\n');
            }
        }
    }
    logical
}

/// Splits an SDC command line into tokens.
///
/// Whitespace separates tokens; `{...}` and `"..."` spans become single
/// tokens with the delimiters stripped. A Tcl bracket expression is
/// unwrapped: `[get_ports {x}]` / `[get_clocks x]` yield the object name,
/// anything else (`[all_outputs]`) yields its inner text as a bare token.
/// All delimiters are ASCII, so byte offsets are valid slice boundaries.
fn tokenize_sdc_line(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'{' => {
                let (inner, next) = delimited_span(line, i + 1, b'}');
                tokens.push(inner);
                i = next;
            }
            b'"' => {
                let (inner, next) = delimited_span(line, i + 1, b'"');
                tokens.push(inner);
                i = next;
            }
            b'[' => {
                let (inner, next) = bracket_expression(line, i);
                let object = inner
                    .strip_prefix("get_ports")
                    .or_else(|| inner.strip_prefix("get_clocks"));
                match object {
                    Some(rest) => {
                        let name = rest.trim().trim_matches(|c| c == '{' || c == '}');
                        if !name.is_empty() {
                            tokens.push(name);
                        }
                    }
                    None => tokens.push(inner.trim()),
                }
                i = next;
            }
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'\t' {
                    i += 1;
                }
                tokens.push(&line[start..i]);
            }
        }
    }

    tokens
}

/// Returns the span from `start` up to the next `close` byte (or end of
/// line), and the index just past the closing delimiter.
fn delimited_span(line: &str, start: usize, close: u8) -> (&str, usize) {
    let bytes = line.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end] != close {
        end += 1;
    }
    let next = if end < bytes.len() { end + 1 } else { end };
    (&line[start..end], next)
}

/// Captures the Tcl bracket expression opening at `open`, balancing nested
/// brackets. Returns the inner text and the index just past the match.
fn bracket_expression(line: &str, open: usize) -> (&str, usize) {
    let bytes = line.as_bytes();
    let mut depth = 0usize;
    let mut end = open;
    while end < bytes.len() {
        match bytes[end] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        end += 1;
    }
    let next = if end < bytes.len() { end + 1 } else { end };
    (&line[open + 1..end.min(bytes.len())], next)
}

/// Parses `create_clock -period <val> [-name <name>] [port]`.
fn parse_create_clock(
    args: &[&str],
    interner: &Interner,
    warn: &dyn Fn(u16, String),
    constraints: &mut SdcConstraints,
) {
    let mut period: Option<f64> = None;
    let mut name: Option<&str> = None;
    let mut port: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "-period" => {
                i += 1;
                if i < args.len() {
                    period = args[i].parse().ok();
                }
            }
            "-name" => {
                i += 1;
                if i < args.len() {
                    name = Some(args[i]);
                }
            }
            s if !s.starts_with('-') => {
                port = Some(s);
            }
            _ => {}
        }
        i += 1;
    }

    let Some(period_val) = period else {
        warn(3, "create_clock: missing -period".to_string());
        return;
    };

    constraints.clock_period = period_val;
    if let Some(clock_name) = name.or(port) {
        constraints.clock_name = Some(interner.get_or_intern(clock_name));
    }
}

/// Parses `set_clock_uncertainty -setup|-hold <val>`.
fn parse_clock_uncertainty(
    args: &[&str],
    warn: &dyn Fn(u16, String),
    constraints: &mut SdcConstraints,
) {
    let value = args.iter().find_map(|t| t.parse::<f64>().ok());
    let Some(value) = value else {
        warn(4, "set_clock_uncertainty: missing value".to_string());
        return;
    };
    if args.contains(&"-hold") {
        constraints.hold_uncertainty = value;
    } else {
        // -setup is the default interpretation when neither flag appears.
        constraints.setup_uncertainty = value;
    }
}

/// Parses `set_input_delay`/`set_output_delay [-max|-min] <delay>
/// [-clock <clk>] [-add_delay] <port>`.
fn parse_io_delay(
    args: &[&str],
    interner: &Interner,
    warn: &dyn Fn(u16, String),
    constraints: &mut SdcConstraints,
    kind: IoDelayKind,
) {
    let mut bound = DelayBound::Max;
    let mut clock: Option<&str> = None;
    let mut delay: Option<f64> = None;
    let mut port: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "-max" => bound = DelayBound::Max,
            "-min" => bound = DelayBound::Min,
            "-add_delay" => {}
            "-clock" => {
                i += 1;
                if i < args.len() {
                    clock = Some(args[i]);
                }
            }
            s if !s.starts_with('-') => {
                if delay.is_none() {
                    if let Ok(v) = s.parse::<f64>() {
                        delay = Some(v);
                    } else {
                        port = Some(s);
                    }
                } else {
                    port = Some(s);
                }
            }
            _ => {}
        }
        i += 1;
    }

    let (Some(delay), Some(port)) = (delay, port) else {
        let cmd = match kind {
            IoDelayKind::Input => "set_input_delay",
            IoDelayKind::Output => "set_output_delay",
        };
        warn(5, format!("{cmd}: missing delay value or port"));
        return;
    };

    constraints.io_delays.push(IoDelay {
        port: interner.get_or_intern(port),
        kind,
        bound,
        clock: clock.map(|c| interner.get_or_intern(c)),
        delay,
    });
}

/// Parses `set_load <value> [all_outputs]`.
fn parse_set_load(args: &[&str], warn: &dyn Fn(u16, String), constraints: &mut SdcConstraints) {
    let value = args.iter().find_map(|t| t.parse::<f64>().ok());
    match value {
        Some(value) => constraints.output_load = value,
        None => warn(6, "set_load: missing value".to_string()),
    }
}

/// Parses `set_timing_derate -early|-late <factor>`.
fn parse_timing_derate(
    args: &[&str],
    warn: &dyn Fn(u16, String),
    constraints: &mut SdcConstraints,
) {
    let factor = args.iter().find_map(|t| t.parse::<f64>().ok());
    let Some(factor) = factor else {
        warn(7, "set_timing_derate: missing factor".to_string());
        return;
    };
    let bound = if args.contains(&"-early") {
        DerateBound::Early
    } else if args.contains(&"-late") {
        DerateBound::Late
    } else {
        warn(7, "set_timing_derate: missing -early or -late".to_string());
        return;
    };
    constraints.derates.push(TimingDerate { factor, bound });
}
