//! Angle expression evaluator.
//!
//! Parameters such as `pi/2` are kept verbatim in the model; this module
//! only answers "what number would that be" for lint and labels.
//! Grammar: `+ - * /`, unary minus, parentheses, numeric literals and
//! the constants `pi`, `π`, `e`.

use std::f64::consts::{E, PI};
use winnow::ascii::float;
use winnow::combinator::alt;
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;

/// Deepest parenthesis nesting `evaluate` will follow.
pub const MAX_NESTING: usize = 64;

/// Evaluate an expression, or `None` if it is malformed, nested deeper
/// than [`MAX_NESTING`], or not finite.
pub fn evaluate(source: &str) -> Option<f64> {
    let mut input = source;
    let value = parse_sum(&mut input, 0).ok()?;
    skip_ws(&mut input);
    if !input.is_empty() || !value.is_finite() {
        return None;
    }
    Some(value)
}

fn skip_ws(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_sum(input: &mut &str, depth: usize) -> ModalResult<f64> {
    let mut acc = parse_product(input, depth)?;
    loop {
        skip_ws(input);
        if let Some(rest) = input.strip_prefix('+') {
            *input = rest;
            acc += parse_product(input, depth)?;
        } else if let Some(rest) = input.strip_prefix('-') {
            *input = rest;
            acc -= parse_product(input, depth)?;
        } else {
            return Ok(acc);
        }
    }
}

fn parse_product(input: &mut &str, depth: usize) -> ModalResult<f64> {
    let mut acc = parse_unary(input, depth)?;
    loop {
        skip_ws(input);
        if let Some(rest) = input.strip_prefix('*') {
            *input = rest;
            acc *= parse_unary(input, depth)?;
        } else if let Some(rest) = input.strip_prefix('/') {
            *input = rest;
            acc /= parse_unary(input, depth)?;
        } else {
            return Ok(acc);
        }
    }
}

/// Any run of leading signs folds into one.
fn parse_unary(input: &mut &str, depth: usize) -> ModalResult<f64> {
    let mut negative = false;
    loop {
        skip_ws(input);
        if let Some(rest) = input.strip_prefix('-') {
            *input = rest;
            negative = !negative;
        } else if let Some(rest) = input.strip_prefix('+') {
            *input = rest;
        } else {
            break;
        }
    }
    let value = parse_atom(input, depth)?;
    Ok(if negative { -value } else { value })
}

fn parse_atom(input: &mut &str, depth: usize) -> ModalResult<f64> {
    skip_ws(input);
    if let Some(rest) = input.strip_prefix('(') {
        if depth >= MAX_NESTING {
            return Err(ErrMode::from_input(input));
        }
        *input = rest;
        let value = parse_sum(input, depth + 1)?;
        skip_ws(input);
        ')'.parse_next(input)?;
        return Ok(value);
    }
    alt(("pi".value(PI), "π".value(PI), parse_number, "e".value(E))).parse_next(input)
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    float.parse_next(input)
}
