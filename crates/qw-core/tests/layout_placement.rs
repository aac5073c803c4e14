//! Integration tests: palette placement, drag snapping, and deletion.

use qw_core::emitter::emit_program;
use qw_core::layout::{
    NewOperation, TrackGeometry, append_operation, drag_operation, resolve_layout,
};
use qw_core::model::*;
use qw_core::parser::parse_program;

const GEOMETRY: TrackGeometry = TrackGeometry {
    base_y: 50.0,
    track_spacing: 100.0,
    origin_x: 40.0,
    start_x: 100.0,
    step_x: 80.0,
    node_size: 36.0,
};

#[test]
fn multi_track_on_track_one_infers_control_zero() {
    let mut circuit = Circuit::new(3);
    let id = append_operation(&mut circuit, &GEOMETRY, NewOperation::new(GateKind::Cnot, 1));

    let op = circuit.get(id).unwrap();
    assert_eq!(op.control, Some(Control::Inferred));
    assert_eq!(circuit.link_of(id).unwrap().control_track, 0);
    assert_eq!(emit_program(&circuit), "declare q[3]\ncnot(0, 1)\n");
}

#[test]
fn explicit_control_wins_over_fallback() {
    let mut circuit = Circuit::new(3);
    let mut new = NewOperation::new(GateKind::Cz, 1);
    new.control = Some(2);
    let id = append_operation(&mut circuit, &GEOMETRY, new);
    assert_eq!(circuit.link_of(id).unwrap().control_track, 2);
}

#[test]
fn deleting_linked_operation_leaves_no_dangling_link() {
    let mut circuit = parse_program("declare q[3]\nh(0)\ncnot(0, 1)\ncz(2, 1)\n").circuit;
    let cnot = circuit
        .operations()
        .find(|op| op.kind == GateKind::Cnot)
        .map(|op| op.id)
        .unwrap();
    assert_eq!(circuit.link_count(), 2);

    let removed = circuit.remove(cnot).unwrap();
    assert_eq!(removed.kind, GateKind::Cnot);
    assert!(!circuit.contains(cnot));
    assert_eq!(circuit.link_count(), 1);
    for view in circuit.links() {
        assert!(circuit.contains(view.target), "link points at a deleted operation");
    }
    assert_eq!(emit_program(&circuit), "declare q[3]\nh(0)\ncz(2, 1)\n");
}

#[test]
fn drags_always_snap_to_the_operation_track() {
    let mut circuit = Circuit::new(3);
    let ids: Vec<_> = (0..3)
        .map(|track| {
            append_operation(&mut circuit, &GEOMETRY, NewOperation::new(GateKind::X, track))
        })
        .collect();

    for (step, pointer_x) in [-500.0, 0.0, 39.0, 41.0, 250.5, 10_000.0].into_iter().enumerate() {
        let id = ids[step % ids.len()];
        let (x, y) = drag_operation(&mut circuit, &GEOMETRY, id, pointer_x).unwrap();
        let op = circuit.get(id).unwrap();
        assert_eq!(y, GEOMETRY.track_y(op.target));
        assert_eq!(op.y, GEOMETRY.track_y(op.target));
        assert!(x >= GEOMETRY.origin_x);
        assert_eq!(op.x, x);
    }
}

#[test]
fn drag_reorders_program_text() {
    let mut circuit = Circuit::new(2);
    let h = append_operation(&mut circuit, &GEOMETRY, NewOperation::new(GateKind::H, 0));
    append_operation(&mut circuit, &GEOMETRY, NewOperation::new(GateKind::X, 1));
    assert_eq!(emit_program(&circuit), "declare q[2]\nh(0)\nx(1)\n");

    drag_operation(&mut circuit, &GEOMETRY, h, 500.0);
    assert_eq!(emit_program(&circuit), "declare q[2]\nx(1)\nh(0)\n");
}

#[test]
fn parsed_layout_renders_on_track_lines() {
    let parsed = parse_program(include_str!("fixtures/ghz.qw"));
    let layout = resolve_layout(&parsed.circuit, &GEOMETRY);
    assert_eq!(layout.tracks.len(), 4);
    assert_eq!(layout.connectors.len(), 3);
    for placed in &layout.operations {
        assert_eq!(placed.y, GEOMETRY.track_y(placed.track));
    }
    for connector in &layout.connectors {
        assert_eq!(connector.from_y, GEOMETRY.track_y(connector.control_track));
    }
}

#[test]
fn dragging_unknown_operation_is_a_no_op() {
    let mut circuit = Circuit::new(1);
    let ghost = Operation::new(GateKind::H, 0).id;
    assert_eq!(drag_operation(&mut circuit, &GEOMETRY, ghost, 200.0), None);
}
