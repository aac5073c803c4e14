//! Lint diagnostics for QW programs.
//!
//! The parser and emitter deliberately accept out-of-range tracks and
//! other physically meaningless input; lint is where those are reported.
//! Nothing here modifies the circuit.

use crate::id::OpId;
use crate::model::*;
use crate::parser::ParsedProgram;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake; the engine will probably reject it.
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The operation this refers to, if any.
    pub op: Option<OpId>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "track-out-of-range").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Lint a parsed program, including declaration-level findings.
#[must_use]
pub fn lint_program(parsed: &ParsedProgram) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    if !parsed.declared {
        diags.push(LintDiagnostic {
            op: None,
            message: format!(
                "No `declare` line; assuming {} track(s).",
                parsed.circuit.track_count
            ),
            severity: LintSeverity::Info,
            rule: "missing-declaration",
        });
    }
    diags.extend(lint_circuit(&parsed.circuit));
    diags
}

/// Lint a circuit regardless of where it came from.
#[must_use]
pub fn lint_circuit(circuit: &Circuit) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    if circuit.track_count == 0 {
        diags.push(LintDiagnostic {
            op: None,
            message: format!("Register `{}` declares no tracks.", circuit.register),
            severity: LintSeverity::Warning,
            rule: "empty-register",
        });
    }
    for op in circuit.ordered() {
        lint_tracks(circuit, op, &mut diags);
        lint_params(op, &mut diags);
    }
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_tracks(circuit: &Circuit, op: &Operation, diags: &mut Vec<LintDiagnostic>) {
    let count = circuit.track_count;
    if op.target >= count {
        diags.push(LintDiagnostic {
            op: Some(op.id),
            message: format!(
                "`{}` targets track {} but only {count} track(s) are declared.",
                op.kind, op.target
            ),
            severity: LintSeverity::Warning,
            rule: "track-out-of-range",
        });
    }

    let Some(control) = circuit.link_of(op.id).map(|link| link.control_track) else {
        return;
    };
    if control >= count {
        diags.push(LintDiagnostic {
            op: Some(op.id),
            message: format!(
                "`{}` is controlled from track {control} but only {count} track(s) are declared.",
                op.kind
            ),
            severity: LintSeverity::Warning,
            rule: "control-out-of-range",
        });
    }
    if control == op.target {
        diags.push(LintDiagnostic {
            op: Some(op.id),
            message: format!("`{}` uses track {control} as both control and target.", op.kind),
            severity: LintSeverity::Warning,
            rule: "control-equals-target",
        });
    }
}

fn lint_params(op: &Operation, diags: &mut Vec<LintDiagnostic>) {
    for param in &op.params {
        if let Param::Symbol(expr) = param
            && param.evaluate().is_none()
        {
            diags.push(LintDiagnostic {
                op: Some(op.id),
                message: format!(
                    "Parameter `{expr}` of `{}` is not a numeric expression.",
                    op.kind
                ),
                severity: LintSeverity::Info,
                rule: "unevaluable-parameter",
            });
        }
    }
}
