//! Track layout: where operations sit on the canvas.
//!
//! Vertical position is a pure function of the track index. Horizontal
//! position is free-form, bounded on the left by the track origin. Drags
//! move operations along their track only; changing track takes a
//! re-add or a text edit.

use crate::id::OpId;
use crate::model::*;
use serde::{Deserialize, Serialize};

/// Canvas geometry shared by the parser, the editor, and the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// y of track 0.
    pub base_y: f32,
    pub track_spacing: f32,
    /// Left edge of every track line. Nothing may be dragged before it.
    pub origin_x: f32,
    /// x of the first operation in sequence order.
    pub start_x: f32,
    /// x distance between consecutive operations in sequence order.
    pub step_x: f32,
    /// Side of the square gate glyph.
    pub node_size: f32,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            base_y: 60.0,
            track_spacing: 80.0,
            origin_x: 60.0,
            start_x: 120.0,
            step_x: 90.0,
            node_size: 40.0,
        }
    }
}

impl TrackGeometry {
    pub fn track_y(&self, track: usize) -> f32 {
        self.base_y + track as f32 * self.track_spacing
    }

    /// Nearest track to `y`, if within half a spacing of it.
    pub fn track_at(&self, y: f32, track_count: usize) -> Option<usize> {
        if track_count == 0 {
            return None;
        }
        let raw = ((y - self.base_y) / self.track_spacing).round();
        if raw < 0.0 {
            return None;
        }
        let track = raw as usize;
        let within = (y - self.track_y(track)).abs() <= self.track_spacing / 2.0;
        (track < track_count && within).then_some(track)
    }

    /// Position of the `index`-th operation in sequence order.
    pub fn sequence_position(&self, index: usize, track: usize) -> (f32, f32) {
        (
            self.start_x + index as f32 * self.step_x,
            self.track_y(track),
        )
    }

    /// Position during a drag: x follows the pointer, y stays on the track.
    pub fn drag_position(&self, track: usize, pointer_x: f32) -> (f32, f32) {
        (pointer_x.max(self.origin_x), self.track_y(track))
    }
}

// ─── Edits ───────────────────────────────────────────────────────────────

/// A palette request for a new operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    pub kind: GateKind,
    pub track: usize,
    /// Explicit control track; `None` lets the fallback rule pick one.
    pub control: Option<usize>,
    pub params: Vec<Param>,
}

impl NewOperation {
    pub fn new(kind: GateKind, track: usize) -> Self {
        Self {
            kind,
            track,
            control: None,
            params: Vec::new(),
        }
    }
}

/// Append an operation to the right of everything already placed.
pub fn append_operation(
    circuit: &mut Circuit,
    geometry: &TrackGeometry,
    new: NewOperation,
) -> OpId {
    let (mut x, y) = geometry.sequence_position(circuit.len(), new.track);
    if let Some(rightmost) = circuit.operations().map(|op| op.x).reduce(f32::max) {
        x = x.max(rightmost + geometry.step_x);
    }

    let mut op = Operation::new(new.kind, new.track)
        .with_params(new.params)
        .at(x, y);
    if let Some(control) = new.control {
        op = op.with_control(control);
    }
    let id = circuit.insert(op);
    log::debug!("placed {id} on track {} at x={x}", new.track);
    id
}

/// Drag an operation horizontally. Returns the snapped position.
pub fn drag_operation(
    circuit: &mut Circuit,
    geometry: &TrackGeometry,
    id: OpId,
    pointer_x: f32,
) -> Option<(f32, f32)> {
    let track = circuit.get(id)?.target;
    let (x, y) = geometry.drag_position(track, pointer_x);
    circuit.set_position(id, x, y).then_some((x, y))
}

// ─── Resolved layout ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLine {
    pub track: usize,
    pub y: f32,
    pub x_start: f32,
    pub x_end: f32,
}

/// An operation as drawn: centre point plus glyph size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOperation {
    pub id: OpId,
    pub kind: GateKind,
    pub track: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub label: String,
}

impl PlacedOperation {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        let half = self.size / 2.0;
        (px - self.x).abs() <= half && (py - self.y).abs() <= half
    }
}

/// Vertical connector from the controlling track to a multi-track gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub link: OpId,
    pub operation: OpId,
    pub control_track: usize,
    pub x: f32,
    pub from_y: f32,
    pub to_y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub tracks: Vec<TrackLine>,
    /// Placed operations in paint order (last = topmost).
    pub operations: Vec<PlacedOperation>,
    pub connectors: Vec<Connector>,
}

/// Resolve every operation and link to canvas coordinates.
pub fn resolve_layout(circuit: &Circuit, geometry: &TrackGeometry) -> LayoutSnapshot {
    let mut ops: Vec<&Operation> = circuit.operations().collect();
    ops.sort_by_key(|op| op.seq);

    let x_end = ops
        .iter()
        .map(|op| op.x)
        .fold(geometry.start_x, f32::max)
        + geometry.step_x;

    let tracks = (0..circuit.track_count)
        .map(|track| TrackLine {
            track,
            y: geometry.track_y(track),
            x_start: geometry.origin_x,
            x_end,
        })
        .collect();

    let operations = ops
        .iter()
        .map(|op| PlacedOperation {
            id: op.id,
            kind: op.kind,
            track: op.target,
            x: op.x,
            y: geometry.track_y(op.target),
            size: geometry.node_size,
            label: label_for(op),
        })
        .collect();

    let connectors = circuit
        .links()
        .into_iter()
        .filter_map(|view| {
            let op = circuit.get(view.target)?;
            Some(Connector {
                link: view.link.id,
                operation: op.id,
                control_track: view.link.control_track,
                x: op.x,
                from_y: geometry.track_y(view.link.control_track),
                to_y: geometry.track_y(op.target),
            })
        })
        .collect();

    LayoutSnapshot {
        tracks,
        operations,
        connectors,
    }
}

/// Topmost operation under the point, if any.
pub fn hit_test(circuit: &Circuit, geometry: &TrackGeometry, px: f32, py: f32) -> Option<OpId> {
    resolve_layout(circuit, geometry)
        .operations
        .iter()
        .rev()
        .find(|placed| placed.contains(px, py))
        .map(|placed| placed.id)
}

fn label_for(op: &Operation) -> String {
    let name = op.kind.name().to_ascii_uppercase();
    match op.params.first() {
        Some(param) if op.kind.class() == KindClass::Rotation => format!("{name}({param})"),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_y_is_linear() {
        let g = TrackGeometry::default();
        assert_eq!(g.track_y(0), 60.0);
        assert_eq!(g.track_y(2), 220.0);
    }

    #[test]
    fn track_at_snaps_to_nearest() {
        let g = TrackGeometry::default();
        assert_eq!(g.track_at(70.0, 3), Some(0));
        assert_eq!(g.track_at(130.0, 3), Some(1));
        assert_eq!(g.track_at(400.0, 3), None);
        assert_eq!(g.track_at(-100.0, 3), None);
    }

    #[test]
    fn drag_clamps_to_origin_and_stays_on_track() {
        let g = TrackGeometry::default();
        let mut circuit = Circuit::new(2);
        let id = append_operation(&mut circuit, &g, NewOperation::new(GateKind::H, 1));

        assert_eq!(drag_operation(&mut circuit, &g, id, 10.0), Some((60.0, 140.0)));
        assert_eq!(drag_operation(&mut circuit, &g, id, 333.0), Some((333.0, 140.0)));
        assert_eq!(circuit.get(id).unwrap().target, 1);
    }

    #[test]
    fn append_goes_right_of_dragged_nodes() {
        let g = TrackGeometry::default();
        let mut circuit = Circuit::new(2);
        let a = append_operation(&mut circuit, &g, NewOperation::new(GateKind::H, 0));
        drag_operation(&mut circuit, &g, a, 900.0);
        let b = append_operation(&mut circuit, &g, NewOperation::new(GateKind::X, 1));
        assert_eq!(circuit.get(b).unwrap().x, 990.0);
    }

    #[test]
    fn connectors_follow_links() {
        let g = TrackGeometry::default();
        let mut circuit = Circuit::new(3);
        let id = append_operation(&mut circuit, &g, NewOperation::new(GateKind::Cnot, 2));
        let layout = resolve_layout(&circuit, &g);
        assert_eq!(layout.tracks.len(), 3);
        assert_eq!(layout.connectors.len(), 1);
        let c = &layout.connectors[0];
        assert_eq!(c.operation, id);
        assert_eq!(c.control_track, 1);
        assert_eq!(c.from_y, g.track_y(1));
        assert_eq!(c.to_y, g.track_y(2));
    }

    #[test]
    fn hit_test_finds_glyph() {
        let g = TrackGeometry::default();
        let mut circuit = Circuit::new(2);
        let id = append_operation(&mut circuit, &g, NewOperation::new(GateKind::H, 0));
        assert_eq!(hit_test(&circuit, &g, 125.0, 65.0), Some(id));
        assert_eq!(hit_test(&circuit, &g, 125.0, 140.0), None);
    }

    #[test]
    fn rotation_label_shows_angle() {
        let g = TrackGeometry::default();
        let mut circuit = Circuit::new(1);
        let mut new = NewOperation::new(GateKind::Rx, 0);
        new.params.push(Param::Symbol("pi/4".into()));
        append_operation(&mut circuit, &g, new);
        assert_eq!(resolve_layout(&circuit, &g).operations[0].label, "RX(pi/4)");
    }
}
