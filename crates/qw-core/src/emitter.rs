//! Emitter: Circuit → QW program text.
//!
//! Program order is horizontal order. Operations are written by ascending
//! x, ties broken by insertion, so whatever the canvas shows left to right
//! is what the text says top to bottom.

use crate::model::*;
use std::fmt::Write;

/// Angle written for rotations that carry no parameter.
pub const DEFAULT_ANGLE: &str = "pi/2";

/// Emit a `Circuit` as program text.
#[must_use]
pub fn emit_program(circuit: &Circuit) -> String {
    let mut out = String::with_capacity(32 + circuit.len() * 16);

    let _ = writeln!(out, "declare {}[{}]", circuit.register, circuit.track_count);
    if circuit.classical_bits > 0 {
        let _ = writeln!(
            out,
            "creg {}[{}]",
            circuit.classical_register, circuit.classical_bits
        );
    }

    for op in circuit.ordered() {
        emit_operation(&mut out, circuit, op);
    }
    out
}

fn emit_operation(out: &mut String, circuit: &Circuit, op: &Operation) {
    let mut args: Vec<String> = Vec::with_capacity(2 + op.params.len());

    match op.kind.class() {
        KindClass::SingleTrack => args.push(op.target.to_string()),
        KindClass::Rotation => {
            args.push(op.target.to_string());
            if op.params.is_empty() {
                args.push(DEFAULT_ANGLE.to_string());
            }
        }
        KindClass::MultiTrack => {
            args.push(control_track(circuit, op).to_string());
            args.push(op.target.to_string());
        }
    }
    args.extend(op.params.iter().map(ToString::to_string));

    let _ = writeln!(out, "{}({})", op.kind.name(), args.join(", "));
}

/// Control track for a multi-track operation: its link's, else the fallback.
pub fn control_track(circuit: &Circuit, op: &Operation) -> usize {
    circuit
        .link_of(op.id)
        .map(|link| link.control_track)
        .unwrap_or_else(|| fallback_control(op.target))
}
