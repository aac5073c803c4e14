//! Canonical circuit data model.
//!
//! A circuit is a graph: every referenced track owns an anchor node (the
//! origin of its track line) and every placed gate is an operation node.
//! Edges are `Link`s, running from the anchor of the controlling track to
//! the multi-track operation that track controls. Removing an operation
//! therefore removes its link with it.

use crate::id::OpId;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_TRACK_COUNT: usize = 2;
pub const DEFAULT_REGISTER: &str = "q";
pub const DEFAULT_CLASSICAL_REGISTER: &str = "c";

// ─── Gate vocabulary ─────────────────────────────────────────────────────

/// How a gate kind consumes its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    /// `kind(track, extra…)`
    SingleTrack,
    /// `kind(track, angle, extra…)`
    Rotation,
    /// `kind(control, target, extra…)`
    MultiTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    T,
    Measure,
    Rx,
    Ry,
    Rz,
    Cnot,
    Cz,
    Swap,
}

impl GateKind {
    pub const ALL: [GateKind; 13] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::S,
        GateKind::T,
        GateKind::Measure,
        GateKind::Rx,
        GateKind::Ry,
        GateKind::Rz,
        GateKind::Cnot,
        GateKind::Cz,
        GateKind::Swap,
    ];

    /// Case-insensitive lookup, including aliases (`cx` → `cnot`).
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "h" => GateKind::H,
            "x" => GateKind::X,
            "y" => GateKind::Y,
            "z" => GateKind::Z,
            "s" => GateKind::S,
            "t" => GateKind::T,
            "measure" => GateKind::Measure,
            "rx" => GateKind::Rx,
            "ry" => GateKind::Ry,
            "rz" => GateKind::Rz,
            "cnot" | "cx" => GateKind::Cnot,
            "cz" => GateKind::Cz,
            "swap" => GateKind::Swap,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical lowercase name used in program text.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::S => "s",
            GateKind::T => "t",
            GateKind::Measure => "measure",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::Cnot => "cnot",
            GateKind::Cz => "cz",
            GateKind::Swap => "swap",
        }
    }

    pub fn class(self) -> KindClass {
        match self {
            GateKind::Rx | GateKind::Ry | GateKind::Rz => KindClass::Rotation,
            GateKind::Cnot | GateKind::Cz | GateKind::Swap => KindClass::MultiTrack,
            _ => KindClass::SingleTrack,
        }
    }

    pub fn is_multi_track(self) -> bool {
        self.class() == KindClass::MultiTrack
    }

    /// Number of track arguments that precede the parameters.
    pub fn track_arity(self) -> usize {
        if self.is_multi_track() { 2 } else { 1 }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Parameters ──────────────────────────────────────────────────────────

/// A gate parameter: a numeric literal or an opaque symbolic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Number(f64),
    Symbol(String),
}

impl Param {
    /// Classify a raw argument. Only finite literals become numbers, so
    /// `inf` and `nan` stay symbolic like any other expression.
    pub fn from_arg(arg: &str) -> Self {
        let arg = arg.trim();
        match arg.parse::<f64>() {
            Ok(n) if n.is_finite() => Param::Number(n),
            _ => Param::Symbol(arg.to_string()),
        }
    }

    /// Best-effort numeric value (`pi/2` → 1.5707…).
    pub fn evaluate(&self) -> Option<f64> {
        match self {
            Param::Number(n) => Some(*n),
            Param::Symbol(s) => crate::expr::evaluate(s),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Number(n) => f.write_str(&format_num(*n)),
            Param::Symbol(s) => f.write_str(s),
        }
    }
}

/// Shortest text that parses back to the same `f64`.
pub fn format_num(n: f64) -> String {
    if n == 0.0 { "0".to_string() } else { n.to_string() }
}

// ─── Control tracks ──────────────────────────────────────────────────────

/// Where a multi-track operation takes its controlling track from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// Given explicitly (text argument or palette choice).
    Explicit(usize),
    /// Not given; derived from the target with `fallback_control`.
    Inferred,
}

impl Control {
    pub fn resolve(self, target: usize) -> usize {
        match self {
            Control::Explicit(track) => track,
            Control::Inferred => fallback_control(target),
        }
    }
}

/// The neighbouring track above the target, or track 1 when the target is 0.
pub fn fallback_control(target: usize) -> usize {
    if target == 0 { 1 } else { target - 1 }
}

// ─── Operations ──────────────────────────────────────────────────────────

/// One placed gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OpId,
    pub kind: GateKind,
    /// Track the gate acts on (the target for multi-track kinds).
    pub target: usize,
    pub x: f32,
    pub y: f32,
    pub params: SmallVec<[Param; 2]>,
    /// Always `Some` for multi-track kinds, `None` otherwise.
    pub control: Option<Control>,
    /// Insertion sequence within the owning circuit; breaks x ties.
    pub seq: u64,
}

impl Operation {
    pub fn new(kind: GateKind, target: usize) -> Self {
        Self {
            id: OpId::for_operation(kind),
            kind,
            target,
            x: 0.0,
            y: 0.0,
            params: SmallVec::new(),
            control: kind.is_multi_track().then_some(Control::Inferred),
            seq: 0,
        }
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    /// Set the control track explicitly. Ignored for single-track kinds.
    pub fn with_control(mut self, control: usize) -> Self {
        if self.kind.is_multi_track() {
            self.control = Some(Control::Explicit(control));
        }
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// The controlling track this operation resolves to, if multi-track.
    pub fn resolved_control(&self) -> Option<usize> {
        self.control.map(|c| c.resolve(self.target))
    }
}

// ─── Links ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Control,
    Target,
}

/// Edge weight: the control relationship of a multi-track operation.
/// The edge source is the controlling track's anchor, the edge target
/// is the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: OpId,
    pub source_role: PortRole,
    pub target_role: PortRole,
    pub control_track: usize,
}

impl Link {
    pub fn new(control_track: usize) -> Self {
        Self {
            id: OpId::for_link(),
            source_role: PortRole::Control,
            target_role: PortRole::Target,
            control_track,
        }
    }
}

/// Borrowed view of a link with its endpoints resolved.
#[derive(Debug, Clone, Copy)]
pub struct LinkView<'a> {
    pub link: &'a Link,
    /// Track of the anchor node the link starts from.
    pub source_track: usize,
    /// Operation the link ends at.
    pub target: OpId,
}

// ─── Circuit ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CircuitNode {
    /// Origin of a track line. Never emitted as program text.
    Anchor { track: usize },
    Op(Operation),
}

/// The canonical circuit: declared size plus the operation graph.
#[derive(Debug, Clone)]
pub struct Circuit {
    pub graph: StableDiGraph<CircuitNode, Link>,
    /// Quantum register name from the declaration line.
    pub register: String,
    pub track_count: usize,
    pub classical_register: String,
    pub classical_bits: usize,
    /// Index from OpId → NodeIndex for fast lookup.
    pub id_index: HashMap<OpId, NodeIndex>,
    anchors: HashMap<usize, NodeIndex>,
    next_seq: u64,
}

impl Circuit {
    #[must_use]
    pub fn new(track_count: usize) -> Self {
        Self {
            graph: StableDiGraph::new(),
            register: DEFAULT_REGISTER.to_string(),
            track_count,
            classical_register: DEFAULT_CLASSICAL_REGISTER.to_string(),
            classical_bits: 0,
            id_index: HashMap::new(),
            anchors: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Insert an operation, assigning its sequence number. Multi-track
    /// operations get their link in the same step.
    pub fn insert(&mut self, mut op: Operation) -> OpId {
        op.seq = self.next_seq;
        self.next_seq += 1;

        if op.kind.is_multi_track() {
            op.control.get_or_insert(Control::Inferred);
        } else {
            op.control = None;
        }

        let id = op.id;
        let control_track = op.resolved_control();
        let idx = self.graph.add_node(CircuitNode::Op(op));
        self.id_index.insert(id, idx);

        if let Some(track) = control_track {
            let anchor = self.anchor(track);
            self.graph.add_edge(anchor, idx, Link::new(track));
        }
        id
    }

    /// Remove an operation together with every link that touches it.
    pub fn remove(&mut self, id: OpId) -> Option<Operation> {
        let idx = self.id_index.remove(&id)?;
        let sources: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();

        let removed = match self.graph.remove_node(idx)? {
            CircuitNode::Op(op) => op,
            CircuitNode::Anchor { .. } => return None,
        };

        // Drop anchors nothing links from anymore.
        for anchor in sources {
            let orphaned = self
                .graph
                .neighbors_directed(anchor, Direction::Outgoing)
                .next()
                .is_none();
            if orphaned && let Some(CircuitNode::Anchor { track }) = self.graph.remove_node(anchor)
            {
                self.anchors.remove(&track);
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: OpId) -> Option<&Operation> {
        let idx = self.id_index.get(&id)?;
        match self.graph.node_weight(*idx)? {
            CircuitNode::Op(op) => Some(op),
            CircuitNode::Anchor { .. } => None,
        }
    }

    /// Move an operation. Track assignment is untouched.
    pub fn set_position(&mut self, id: OpId, x: f32, y: f32) -> bool {
        let Some(idx) = self.id_index.get(&id) else {
            return false;
        };
        match self.graph.node_weight_mut(*idx) {
            Some(CircuitNode::Op(op)) => {
                op.x = x;
                op.y = y;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: OpId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Number of operations (anchors excluded).
    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    /// Operations in graph order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.graph
            .node_indices()
            .filter_map(move |idx| match &self.graph[idx] {
                CircuitNode::Op(op) => Some(op),
                CircuitNode::Anchor { .. } => None,
            })
    }

    /// Operations in program order: ascending x, ties by insertion.
    pub fn ordered(&self) -> Vec<&Operation> {
        let mut ops: Vec<&Operation> = self.operations().collect();
        ops.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.seq.cmp(&b.seq)));
        ops
    }

    /// The link owned by a multi-track operation.
    pub fn link_of(&self, id: OpId) -> Option<&Link> {
        let idx = self.id_index.get(&id)?;
        self.graph
            .edges_directed(*idx, Direction::Incoming)
            .next()
            .map(|edge| edge.weight())
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn links(&self) -> Vec<LinkView<'_>> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e)?;
                let source_track = match self.graph.node_weight(source)? {
                    CircuitNode::Anchor { track } => *track,
                    CircuitNode::Op(_) => return None,
                };
                let target = match self.graph.node_weight(target)? {
                    CircuitNode::Op(op) => op.id,
                    CircuitNode::Anchor { .. } => return None,
                };
                Some(LinkView {
                    link: self.graph.edge_weight(e)?,
                    source_track,
                    target,
                })
            })
            .collect()
    }

    /// Highest track index any operation or link refers to.
    pub fn max_referenced_track(&self) -> Option<usize> {
        self.operations()
            .flat_map(|op| std::iter::once(op.target).chain(op.resolved_control()))
            .max()
    }

    /// Anchor node for a track, created on first use.
    fn anchor(&mut self, track: usize) -> NodeIndex {
        if let Some(idx) = self.anchors.get(&track) {
            return *idx;
        }
        let idx = self.graph.add_node(CircuitNode::Anchor { track });
        self.anchors.insert(track, idx);
        idx
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK_COUNT)
    }
}
