//! Parser for QW program text → `Circuit`.
//!
//! Built on `winnow` 0.7. The language is line-oriented:
//!
//! ```text
//! declare q[2]      # or: qreg q[2]
//! creg c[2]
//! h(0)
//! cnot(0, 1)
//! rz(1, pi/4)
//! ```
//!
//! Parsing never fails. A line that cannot be understood is skipped and
//! reported as a `ParseDiagnostic`, so a half-typed program still yields
//! every operation that *is* well formed.

use crate::layout::TrackGeometry;
use crate::model::*;
use std::fmt;
use winnow::ascii::{digit1, space0, space1};
use winnow::combinator::{delimited, opt};
use winnow::error::{ContextError, ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::take_while;

/// Result of parsing a program: the circuit plus every skipped line.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub circuit: Circuit,
    /// Whether a quantum register declaration was seen.
    pub declared: bool,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// A line the parser skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseDiagnostic {
    /// 1-based line number.
    pub line: usize,
    /// The line as written, without its trailing newline.
    pub raw: String,
    pub reason: SkipReason,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (`{}`)", self.line, self.reason, self.raw.trim())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Not of the shape `name(args…)`.
    NotAnInvocation,
    UnknownKind(String),
    MissingArguments {
        kind: GateKind,
        expected: usize,
        found: usize,
    },
    /// A track argument that is not a non-negative integer.
    InvalidTrack(String),
    /// Starts with `declare`/`qreg`/`creg` but is not `<name>[<N>]`.
    MalformedDeclaration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnInvocation => f.write_str("expected `kind(args…)`"),
            SkipReason::UnknownKind(name) => write!(f, "unknown operation `{name}`"),
            SkipReason::MissingArguments {
                kind,
                expected,
                found,
            } => write!(f, "`{kind}` needs {expected} track argument(s), got {found}"),
            SkipReason::InvalidTrack(arg) => write!(f, "`{arg}` is not a track index"),
            SkipReason::MalformedDeclaration => f.write_str("expected `<name>[<size>]`"),
        }
    }
}

/// Parse program text using the default track geometry.
#[must_use = "parsing result should be used"]
pub fn parse_program(input: &str) -> ParsedProgram {
    parse_program_with(input, &TrackGeometry::default())
}

/// Parse program text, placing operations with `geometry`.
#[must_use = "parsing result should be used"]
pub fn parse_program_with(input: &str, geometry: &TrackGeometry) -> ParsedProgram {
    let mut circuit = Circuit::new(DEFAULT_TRACK_COUNT);
    let mut declared = false;
    let mut diagnostics = Vec::new();
    let mut placed = 0usize;

    for (n, raw) in input.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let result = match register_keyword(line) {
            Some(keyword) => parse_register_line(line).map(|(name, size)| {
                match keyword {
                    RegisterKeyword::Quantum => {
                        circuit.register = name.to_string();
                        circuit.track_count = size;
                        declared = true;
                    }
                    RegisterKeyword::Classical => {
                        circuit.classical_register = name.to_string();
                        circuit.classical_bits = size;
                    }
                }
            }),
            None => parse_invocation_line(line).map(|op| {
                let (x, y) = geometry.sequence_position(placed, op.target);
                circuit.insert(op.at(x, y));
                placed += 1;
            }),
        };

        if let Err(reason) = result {
            let diagnostic = ParseDiagnostic {
                line: n + 1,
                raw: raw.to_string(),
                reason,
            };
            log::warn!("skipped {diagnostic}");
            diagnostics.push(diagnostic);
        }
    }

    if !declared {
        circuit.track_count = circuit
            .max_referenced_track()
            .map_or(1, |t| t.saturating_add(1));
    }

    log::debug!(
        "parsed {} operation(s) on {} track(s), {} line(s) skipped",
        circuit.len(),
        circuit.track_count,
        diagnostics.len()
    );

    ParsedProgram {
        circuit,
        declared,
        diagnostics,
    }
}

// ─── Lines ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisterKeyword {
    Quantum,
    Classical,
}

/// Drop a `#` comment (whole-line or trailing).
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn register_keyword(line: &str) -> Option<RegisterKeyword> {
    let mut rest = line;
    let word = parse_identifier(&mut rest).ok()?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    match word {
        "declare" | "qreg" => Some(RegisterKeyword::Quantum),
        "creg" => Some(RegisterKeyword::Classical),
        _ => None,
    }
}

fn parse_register_line(line: &str) -> Result<(&str, usize), SkipReason> {
    let mut rest = line;
    let parsed = (parse_identifier, space1, parse_register)
        .map(|(_, _, register)| register)
        .parse_next(&mut rest);
    match parsed {
        Ok(register) if at_line_end(&mut rest) => Ok(register),
        _ => Err(SkipReason::MalformedDeclaration),
    }
}

fn parse_invocation_line(line: &str) -> Result<Operation, SkipReason> {
    let mut rest = line;
    let (name, args) = match parse_invocation.parse_next(&mut rest) {
        Ok(parsed) if at_line_end(&mut rest) => parsed,
        _ => return Err(SkipReason::NotAnInvocation),
    };

    let kind = GateKind::from_name(name).ok_or_else(|| SkipReason::UnknownKind(name.into()))?;
    let arity = kind.track_arity();
    if args.len() < arity {
        return Err(SkipReason::MissingArguments {
            kind,
            expected: arity,
            found: args.len(),
        });
    }

    let control = if kind.is_multi_track() {
        Some(parse_track(args[0])?)
    } else {
        None
    };
    let target = parse_track(args[arity - 1])?;
    let params = args[arity..].iter().map(|arg| Param::from_arg(arg));

    let mut op = Operation::new(kind, target).with_params(params);
    if let Some(control) = control {
        op = op.with_control(control);
    }
    Ok(op)
}

fn parse_track(arg: &str) -> Result<usize, SkipReason> {
    arg.parse::<usize>()
        .map_err(|_| SkipReason::InvalidTrack(arg.to_string()))
}

/// Accept an optional `;` and then nothing else.
fn at_line_end(input: &mut &str) -> bool {
    skip_space(input);
    let _ = opt::<_, _, ContextError, _>(';').parse_next(input);
    skip_space(input);
    input.is_empty()
}

// ─── Low-level parsers ──────────────────────────────────────────────────

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    let _: Result<&str, winnow::error::ErrMode<ContextError>> = space0.parse_next(input);
}

fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

/// `name[size]`
fn parse_register<'a>(input: &mut &'a str) -> ModalResult<(&'a str, usize)> {
    let name = parse_identifier(input)?;
    skip_space(input);
    let size = delimited(
        ('[', space0),
        digit1.try_map(str::parse::<usize>),
        (space0, ']'),
    )
    .parse_next(input)?;
    Ok((name, size))
}

/// `name(arg, arg, …)` → name plus trimmed, non-empty args.
///
/// Arguments may hold parenthesized expressions such as `-(pi/4)`; the
/// list closes on the matching `)` and splits only on top-level commas.
fn parse_invocation<'a>(input: &mut &'a str) -> ModalResult<(&'a str, Vec<&'a str>)> {
    let name = parse_identifier(input)?;
    skip_space(input);
    '('.parse_next(input)?;
    let inner = take_balanced(input)?;
    ')'.parse_next(input)?;
    let args = split_top_level(inner)
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect();
    Ok((name, args))
}

/// Everything up to, not including, the `)` that closes the current group.
fn take_balanced<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let source: &'a str = *input;
    let mut depth = 0usize;
    for (i, c) in source.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                let (inner, rest) = source.split_at(i);
                *input = rest;
                return Ok(inner);
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    Err(ErrMode::from_input(input))
}

fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}
