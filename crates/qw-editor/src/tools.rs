//! Tool system for canvas interactions.
//!
//! Each tool translates input events into `CircuitMutation`s that the
//! `SyncController` applies to the canvas.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Palette Tool |
//! |----------|-------------|--------------|
//! | **Shift** | Toggle in selection | - |

use crate::input::InputEvent;
use crate::sync::CircuitMutation;
use qw_core::id::OpId;
use qw_core::layout::NewOperation;
use qw_core::model::GateKind;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Palette(GateKind),
}

/// The operation under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub id: OpId,
    /// Current x of the hit operation.
    pub x: f32,
}

/// What the canvas knows about the pointer position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToolContext {
    pub hit: Option<HitInfo>,
    /// Track under the pointer, if it is close to one.
    pub track: Option<usize>,
}

pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<CircuitMutation>;
}

// ─── Select Tool ─────────────────────────────────────────────────────────

/// Click to select, drag to slide an operation along its track.
#[derive(Debug, Default)]
pub struct SelectTool {
    dragging: Option<OpId>,
    /// Pointer x minus operation x at grab time, so the glyph doesn't jump.
    grab_offset: f32,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<OpId> {
        self.dragging
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<CircuitMutation> {
        match event {
            InputEvent::PointerDown { x, modifiers, .. } => match ctx.hit {
                Some(hit) => {
                    self.dragging = Some(hit.id);
                    self.grab_offset = x - hit.x;
                    vec![CircuitMutation::Select {
                        id: hit.id,
                        extend: modifiers.shift,
                    }]
                }
                None => {
                    self.dragging = None;
                    if modifiers.shift {
                        vec![]
                    } else {
                        vec![CircuitMutation::ClearSelection]
                    }
                }
            },
            InputEvent::PointerMove { x, .. } => match self.dragging {
                Some(id) => vec![CircuitMutation::MoveOperation {
                    id,
                    pointer_x: x - self.grab_offset,
                }],
                None => vec![],
            },
            InputEvent::PointerUp { .. } => {
                self.dragging = None;
                vec![]
            }
            InputEvent::KeyDown { .. } => vec![],
        }
    }
}

// ─── Palette Tool ────────────────────────────────────────────────────────

/// Click an empty spot on a track to append an operation of `kind` there.
#[derive(Debug, Clone, Copy)]
pub struct PaletteTool {
    pub kind: GateKind,
}

impl PaletteTool {
    pub fn new(kind: GateKind) -> Self {
        Self { kind }
    }
}

impl Tool for PaletteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Palette(self.kind)
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<CircuitMutation> {
        match (event, ctx.hit, ctx.track) {
            (InputEvent::PointerDown { .. }, None, Some(track)) => {
                vec![CircuitMutation::AddOperation(NewOperation::new(
                    self.kind, track,
                ))]
            }
            _ => vec![],
        }
    }
}
