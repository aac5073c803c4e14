//! Integration tests: parse → emit → re-parse round-trip.
//!
//! Verifies that no operation, track, control, or parameter is lost when
//! converting program text → Circuit → program text.

use pretty_assertions::assert_eq;
use qw_core::OpId;
use qw_core::emitter::{DEFAULT_ANGLE, control_track, emit_program};
use qw_core::layout::{NewOperation, TrackGeometry, append_operation};
use qw_core::lint::lint_program;
use qw_core::model::*;
use qw_core::parser::{SkipReason, parse_program};

// ─── Helpers ─────────────────────────────────────────────────────────────

/// What an operation means, independent of ids and coordinates.
type Signature = (GateKind, usize, Option<usize>, Vec<Param>);

fn signature(circuit: &Circuit) -> Vec<Signature> {
    circuit
        .ordered()
        .into_iter()
        .map(|op| {
            let control = op.kind.is_multi_track().then(|| control_track(circuit, op));
            let mut params: Vec<Param> = op.params.to_vec();
            if op.kind.class() == KindClass::Rotation && params.is_empty() {
                params.push(Param::Symbol(DEFAULT_ANGLE.into()));
            }
            (op.kind, op.target, control, params)
        })
        .collect()
}

fn assert_roundtrip_preserves(circuit: &Circuit) {
    let emitted = emit_program(circuit);
    let reparsed = parse_program(&emitted);
    assert!(
        reparsed.diagnostics.is_empty(),
        "emitter produced unparseable lines:\n{emitted}\n{:?}",
        reparsed.diagnostics
    );
    assert_eq!(reparsed.circuit.track_count, circuit.track_count);
    assert_eq!(signature(&reparsed.circuit), signature(circuit));
    assert_eq!(emit_program(&reparsed.circuit), emitted, "emit is not idempotent");
}

fn link_invariant_holds(circuit: &Circuit) {
    for op in circuit.operations() {
        let links: Vec<_> = circuit
            .links()
            .into_iter()
            .filter(|view| view.target == op.id)
            .collect();
        if op.kind.is_multi_track() {
            assert_eq!(links.len(), 1, "{} must own exactly one link", op.id);
            assert_ne!(links[0].link.control_track, op.target);
            assert_eq!(links[0].source_track, links[0].link.control_track);
        } else {
            assert!(links.is_empty(), "{} must not own a link", op.id);
        }
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn bell_fixture_parses_to_two_operations() {
    let parsed = parse_program(include_str!("fixtures/bell.qw"));
    assert_eq!(parsed.circuit.track_count, 2);

    let ops = parsed.circuit.ordered();
    assert_eq!(ops.len(), 2);
    assert_eq!((ops[0].kind, ops[0].target), (GateKind::H, 0));
    assert_eq!((ops[1].kind, ops[1].target), (GateKind::Cnot, 1));

    let link = parsed.circuit.link_of(ops[1].id).expect("cnot owns a link");
    assert_eq!(link.control_track, 0);
    assert_eq!(parsed.circuit.link_count(), 1);
}

#[test]
fn rotation_without_parameter_emits_default_angle() {
    let mut circuit = Circuit::new(1);
    circuit.insert(Operation::new(GateKind::Ry, 0));
    assert_eq!(emit_program(&circuit), format!("declare q[1]\nry(0, {DEFAULT_ANGLE})\n"));
}

// ─── Round-trip ──────────────────────────────────────────────────────────

#[test]
fn roundtrip_fixtures() {
    for input in [
        include_str!("fixtures/bell.qw"),
        include_str!("fixtures/ghz.qw"),
        include_str!("fixtures/rotations.qw"),
    ] {
        let parsed = parse_program(input);
        assert!(parsed.diagnostics.is_empty());
        assert_roundtrip_preserves(&parsed.circuit);
    }
}

#[test]
fn roundtrip_built_circuit_in_canonical_order() {
    let mut circuit = Circuit::new(4);
    let ops = [
        Operation::new(GateKind::H, 0),
        Operation::new(GateKind::Rx, 1).with_params([Param::Number(0.125)]),
        Operation::new(GateKind::Rz, 3),
        Operation::new(GateKind::Cnot, 2).with_control(0),
        Operation::new(GateKind::Swap, 3),
        Operation::new(GateKind::Measure, 2).with_params([Param::Number(1.0)]),
    ];
    for (i, op) in ops.into_iter().enumerate() {
        circuit.insert(op.at(100.0 + i as f32 * 50.0, 0.0));
    }
    circuit.classical_bits = 4;

    assert_roundtrip_preserves(&circuit);
}

#[test]
fn roundtrip_keeps_symbolic_and_numeric_params_apart() {
    let parsed = parse_program("declare q[1]\nrx(0, 2*pi)\nry(0, 2)\n");
    let emitted = emit_program(&parsed.circuit);
    let ops = parse_program(&emitted).circuit;
    let params: Vec<Param> = ops.ordered().iter().map(|op| op.params[0].clone()).collect();
    assert_eq!(
        params,
        vec![Param::Symbol("2*pi".into()), Param::Number(2.0)]
    );
}

// ─── Invariants ──────────────────────────────────────────────────────────

#[test]
fn well_formed_input_keeps_tracks_in_bounds() {
    for input in [
        include_str!("fixtures/bell.qw"),
        include_str!("fixtures/ghz.qw"),
        include_str!("fixtures/rotations.qw"),
    ] {
        let parsed = parse_program(input);
        let n = parsed.circuit.track_count;
        for op in parsed.circuit.operations() {
            assert!(op.target < n, "{} targets {} of {n}", op.id, op.target);
        }
    }
}

#[test]
fn parsed_multi_track_operations_own_one_link() {
    for input in [
        include_str!("fixtures/bell.qw"),
        include_str!("fixtures/ghz.qw"),
        include_str!("fixtures/rotations.qw"),
    ] {
        link_invariant_holds(&parse_program(input).circuit);
    }
}

#[test]
fn palette_built_multi_track_operations_own_one_link() {
    let geometry = TrackGeometry::default();
    let mut circuit = Circuit::new(3);
    let mut explicit = NewOperation::new(GateKind::Cz, 1);
    explicit.control = Some(2);
    let ids: Vec<OpId> = [
        NewOperation::new(GateKind::Cnot, 0),
        NewOperation::new(GateKind::H, 2),
        NewOperation::new(GateKind::Swap, 2),
        explicit,
        NewOperation::new(GateKind::Rz, 0),
    ]
    .into_iter()
    .map(|new| append_operation(&mut circuit, &geometry, new))
    .collect();

    link_invariant_holds(&circuit);
    assert_eq!(circuit.link_count(), 3);
    assert_eq!(circuit.link_of(ids[0]).map(|l| l.control_track), Some(1));
    assert_eq!(circuit.link_of(ids[2]).map(|l| l.control_track), Some(1));

    circuit.remove(ids[0]);
    link_invariant_holds(&circuit);
    assert_eq!(circuit.link_count(), 2);
    assert_roundtrip_preserves(&circuit);
}

#[test]
fn largest_track_index_survives_roundtrip() {
    let parsed = parse_program("x(18446744073709551615)\n");
    assert_eq!(parsed.circuit.track_count, usize::MAX);
    assert_roundtrip_preserves(&parsed.circuit);
}

#[test]
fn parenthesized_angles_roundtrip_and_lint_clean() {
    let input = "declare q[1]\nrz(0, -(pi/4))\nrx(0, 2*(pi/3))\n";
    let parsed = parse_program(input);
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(emit_program(&parsed.circuit), input);
    assert_roundtrip_preserves(&parsed.circuit);
    assert_eq!(lint_program(&parsed), vec![]);

    let angle = parsed.circuit.ordered()[0].params[0].evaluate().unwrap();
    assert!((angle + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
}

#[test]
fn pathological_angles_lint_without_aborting() {
    let signs = format!("declare q[1]\nrx(0, {}1)\n", "-".repeat(200_000));
    assert_eq!(lint_program(&parse_program(&signs)), vec![]);

    let nested = format!(
        "declare q[1]\nrx(0, {}1{})\n",
        "(".repeat(10_000),
        ")".repeat(10_000)
    );
    let rules: Vec<&str> = lint_program(&parse_program(&nested))
        .into_iter()
        .map(|d| d.rule)
        .collect();
    assert_eq!(rules, vec!["unevaluable-parameter"]);
}

#[test]
fn messy_fixture_recovers_what_it_can() {
    let parsed = parse_program(include_str!("fixtures/messy.qw"));
    let kinds: Vec<GateKind> = parsed.circuit.ordered().iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![GateKind::H, GateKind::X, GateKind::Y]);

    let lines: Vec<usize> = parsed.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![4, 5, 7, 10]);
    assert_eq!(
        parsed.diagnostics[1].reason,
        SkipReason::UnknownKind("toffoli".into())
    );
    assert_eq!(parsed.diagnostics[2].reason, SkipReason::InvalidTrack("two".into()));
}
