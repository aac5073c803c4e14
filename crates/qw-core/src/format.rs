//! Program formatting: parse → canonical emit.
//!
//! Normalizes kind aliases (`CX` → `cnot`), argument spacing, comments and
//! blank lines. Lines the parser cannot read are dropped from the output
//! and handed back as diagnostics so callers can decide whether to accept
//! the result.

use crate::emitter::emit_program;
use crate::parser::{ParseDiagnostic, parse_program};

#[derive(Debug, Clone)]
pub struct Formatted {
    pub text: String,
    /// Lines that did not survive formatting.
    pub dropped: Vec<ParseDiagnostic>,
}

impl Formatted {
    /// True when formatting lost nothing but comments and whitespace.
    pub fn is_lossless(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Format program text into its canonical form.
///
/// Idempotent: `format_program(&format_program(s).text).text == format_program(s).text`.
pub fn format_program(text: &str) -> Formatted {
    let parsed = parse_program(text);
    Formatted {
        text: emit_program(&parsed.circuit),
        dropped: parsed.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_normalizes() {
        let input = "# bell pair\nqreg q[2]\n\n  H( 0 )\nCX(0,1);\n";
        let formatted = format_program(input);
        assert!(formatted.is_lossless());
        assert_eq!(formatted.text, "declare q[2]\nh(0)\ncnot(0, 1)\n");
    }

    #[test]
    fn format_is_idempotent() {
        let input = "declare q[3]\nrx(0)\nswap(2,1)\n";
        let first = format_program(input).text;
        let second = format_program(&first).text;
        assert_eq!(first, second);
    }

    #[test]
    fn format_reports_dropped_lines() {
        let formatted = format_program("declare q[1]\nh(0)\nwat(0)\n");
        assert!(!formatted.is_lossless());
        assert_eq!(formatted.dropped[0].line, 3);
        assert_eq!(formatted.text, "declare q[1]\nh(0)\n");
    }
}
