//! View synchronization: canvas ↔ program text.
//!
//! Exactly one view is live at a time. Edits go to the live view only and
//! the other view is refreshed wholesale when it is activated:
//!
//! - **Visual → Text**: the text is regenerated from the circuit.
//! - **Text → Visual**: the text is re-parsed into a brand-new circuit,
//!   replacing every operation and link. Visual-only state such as the
//!   selection is dropped.
//!
//! Translating on every keystroke or drag frame would make typing and
//! dragging fight each other, so nothing is translated between
//! activations.

use crate::input::InputEvent;
use crate::tools::{HitInfo, Tool, ToolContext};
use qw_core::emitter::emit_program;
use qw_core::id::OpId;
use qw_core::layout::{self, LayoutSnapshot, NewOperation, TrackGeometry};
use qw_core::model::Circuit;
use qw_core::parser::{ParseDiagnostic, ParsedProgram, parse_program_with};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Visual,
    Text,
}

impl ActiveView {
    pub fn other(self) -> Self {
        match self {
            ActiveView::Visual => ActiveView::Text,
            ActiveView::Text => ActiveView::Visual,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("cannot edit the {attempted:?} view while the {active:?} view is active")]
    InactiveView {
        active: ActiveView,
        attempted: ActiveView,
    },

    #[error("no operation with id `{0}`")]
    UnknownOperation(OpId),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// What an activation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The requested view was already active.
    Unchanged,
    TextRegenerated,
    /// The circuit was rebuilt from text; `skipped` lines were unreadable.
    CircuitRebuilt { skipped: usize },
}

/// An edit to the visual view.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitMutation {
    AddOperation(NewOperation),
    /// Drag horizontally; the operation keeps its track.
    MoveOperation { id: OpId, pointer_x: f32 },
    RemoveOperation { id: OpId },
    SetTrackCount { count: usize },
    /// Select an operation; `extend` toggles it within the current selection.
    Select { id: OpId, extend: bool },
    ClearSelection,
}

/// Authoritative program text plus its declared size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProgram {
    pub text: String,
    pub track_count: usize,
}

/// Owns the canonical circuit and the program text, and decides when one
/// is derived from the other.
#[derive(Debug, Clone)]
pub struct SyncController {
    active: ActiveView,
    circuit: Circuit,
    text: String,
    selection: SmallVec<[OpId; 4]>,
    diagnostics: Vec<ParseDiagnostic>,
    geometry: TrackGeometry,
}

impl SyncController {
    /// Empty circuit, visual view active.
    pub fn new(geometry: TrackGeometry) -> Self {
        let circuit = Circuit::default();
        let text = regenerate_text(&circuit);
        Self {
            active: ActiveView::Visual,
            circuit,
            text,
            selection: SmallVec::new(),
            diagnostics: Vec::new(),
            geometry,
        }
    }

    /// Start from program text with the text view active. The circuit is
    /// parsed once so both views agree from the outset.
    pub fn from_text(text: &str, geometry: TrackGeometry) -> Self {
        let parsed = resync_circuit(text, &geometry);
        Self {
            active: ActiveView::Text,
            circuit: parsed.circuit,
            text: text.to_string(),
            selection: SmallVec::new(),
            diagnostics: parsed.diagnostics,
            geometry,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn active_view(&self) -> ActiveView {
        self.active
    }

    /// The circuit as last synchronized. Stale while the text view is active.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The text as last synchronized. Stale while the visual view is active.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> &[OpId] {
        &self.selection
    }

    /// Lines skipped when the current text was parsed. Empty once the text
    /// is regenerated from the circuit or replaced by `set_text`.
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn layout(&self) -> LayoutSnapshot {
        layout::resolve_layout(&self.circuit, &self.geometry)
    }

    /// The program as the live view currently has it, without switching
    /// views. Raw text when the text view is live, regenerated text when
    /// the canvas is live.
    pub fn canonical(&self) -> CanonicalProgram {
        match self.active {
            ActiveView::Visual => CanonicalProgram {
                text: regenerate_text(&self.circuit),
                track_count: self.circuit.track_count,
            },
            ActiveView::Text => CanonicalProgram {
                text: self.text.clone(),
                track_count: resync_circuit(&self.text, &self.geometry)
                    .circuit
                    .track_count,
            },
        }
    }

    pub fn canonical_text(&self) -> String {
        self.canonical().text
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Make `view` the live view, refreshing it from the other one.
    pub fn activate(&mut self, view: ActiveView) -> Transition {
        if view == self.active {
            return Transition::Unchanged;
        }

        let transition = match view {
            ActiveView::Text => {
                self.text = regenerate_text(&self.circuit);
                self.diagnostics.clear();
                Transition::TextRegenerated
            }
            ActiveView::Visual => {
                let parsed = resync_circuit(&self.text, &self.geometry);
                self.circuit = parsed.circuit;
                self.diagnostics = parsed.diagnostics;
                self.selection.clear();
                Transition::CircuitRebuilt {
                    skipped: self.diagnostics.len(),
                }
            }
        };
        self.active = view;
        log::debug!("activated {view:?} view: {transition:?}");
        transition
    }

    pub fn toggle_view(&mut self) -> Transition {
        self.activate(self.active.other())
    }

    // ─── Text edits ──────────────────────────────────────────────────────

    /// Replace the program text. Only valid while the text view is live.
    pub fn set_text(&mut self, text: &str) -> SyncResult<()> {
        self.require(ActiveView::Text)?;
        self.text = text.to_string();
        self.diagnostics.clear();
        Ok(())
    }

    // ─── Canvas edits ────────────────────────────────────────────────────

    /// Apply a canvas edit. Returns the id of a newly added operation.
    pub fn apply_mutation(&mut self, mutation: CircuitMutation) -> SyncResult<Option<OpId>> {
        self.require(ActiveView::Visual)?;

        match mutation {
            CircuitMutation::AddOperation(new) => {
                let id = layout::append_operation(&mut self.circuit, &self.geometry, new);
                return Ok(Some(id));
            }
            CircuitMutation::MoveOperation { id, pointer_x } => {
                layout::drag_operation(&mut self.circuit, &self.geometry, id, pointer_x)
                    .ok_or(SyncError::UnknownOperation(id))?;
            }
            CircuitMutation::RemoveOperation { id } => {
                self.circuit
                    .remove(id)
                    .ok_or(SyncError::UnknownOperation(id))?;
                self.selection.retain(|selected| *selected != id);
            }
            CircuitMutation::SetTrackCount { count } => {
                self.circuit.track_count = count;
            }
            CircuitMutation::Select { id, extend } => {
                if !self.circuit.contains(id) {
                    return Err(SyncError::UnknownOperation(id));
                }
                if !extend {
                    self.selection.clear();
                    self.selection.push(id);
                } else if let Some(pos) = self.selection.iter().position(|s| *s == id) {
                    self.selection.remove(pos);
                } else {
                    self.selection.push(id);
                }
            }
            CircuitMutation::ClearSelection => self.selection.clear(),
        }
        Ok(None)
    }

    /// Delete every selected operation. Returns how many were removed.
    pub fn delete_selected(&mut self) -> SyncResult<usize> {
        self.require(ActiveView::Visual)?;
        let selected = std::mem::take(&mut self.selection);
        let removed = selected
            .into_iter()
            .filter(|id| self.circuit.remove(*id).is_some())
            .count();
        Ok(removed)
    }

    /// Route an input event through a tool and apply what it produces.
    pub fn dispatch(&mut self, tool: &mut dyn Tool, event: &InputEvent) -> SyncResult<Vec<OpId>> {
        self.require(ActiveView::Visual)?;
        let context = self.tool_context(event);
        let mut added = Vec::new();
        for mutation in tool.handle(event, &context) {
            if let Some(id) = self.apply_mutation(mutation)? {
                added.push(id);
            }
        }
        Ok(added)
    }

    fn tool_context(&self, event: &InputEvent) -> ToolContext {
        let Some((x, y)) = event.position() else {
            return ToolContext::default();
        };
        let hit = layout::hit_test(&self.circuit, &self.geometry, x, y).and_then(|id| {
            self.circuit.get(id).map(|op| HitInfo { id, x: op.x })
        });
        ToolContext {
            hit,
            track: self.geometry.track_at(y, self.circuit.track_count),
        }
    }

    fn require(&self, view: ActiveView) -> SyncResult<()> {
        if self.active == view {
            return Ok(());
        }
        log::warn!("rejected {view:?} edit while {:?} view is active", self.active);
        Err(SyncError::InactiveView {
            active: self.active,
            attempted: view,
        })
    }
}

// ─── Pure transitions ────────────────────────────────────────────────────

/// Visual → Text: the text a circuit stands for.
pub fn regenerate_text(circuit: &Circuit) -> String {
    emit_program(circuit)
}

/// Text → Visual: a brand-new circuit from text.
pub fn resync_circuit(text: &str, geometry: &TrackGeometry) -> ParsedProgram {
    parse_program_with(text, geometry)
}
