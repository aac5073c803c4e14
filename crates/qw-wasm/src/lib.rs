//! WASM bridge for QW: exposes the circuit editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every method takes and
//! returns primitives or JSON strings so the page never sees Rust types.
//! Running a circuit is left to the page: it asks for `request_json()`,
//! posts it to the engine, and renders the answer.

use qw_core::layout::{NewOperation, TrackGeometry};
use qw_core::lint::{LintDiagnostic, LintSeverity, lint_circuit, lint_program};
use qw_core::model::GateKind;
use qw_core::parser::{ParseDiagnostic, parse_program_with};
use qw_editor::input::{InputEvent, Modifiers};
use qw_editor::shortcuts::{ShortcutAction, ShortcutMap};
use qw_editor::sync::{ActiveView, CircuitMutation, SyncController, Transition};
use qw_editor::tools::{PaletteTool, SelectTool, Tool, ToolKind};
use qw_exec::{EngineConfig, ExecutionRequest};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
///
/// Holds the sync controller and the active tool. All interaction from the
/// page goes through this struct.
#[wasm_bindgen]
pub struct QwCanvas {
    controller: SyncController,
    active_tool: ToolKind,
    select_tool: SelectTool,
    palette_tool: PaletteTool,
    config: EngineConfig,
}

impl Default for QwCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl QwCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            controller: SyncController::new(TrackGeometry::default()),
            active_tool: ToolKind::Select,
            select_tool: SelectTool::new(),
            palette_tool: PaletteTool::new(GateKind::H),
            config: EngineConfig::default(),
        }
    }

    // ─── Text view ───────────────────────────────────────────────────────

    /// Replace the program text. Returns `false` while the canvas is live.
    pub fn set_text(&mut self, text: &str) -> bool {
        self.controller.set_text(text).is_ok()
    }

    /// The program as the live view has it.
    pub fn get_text(&self) -> String {
        self.controller.canonical_text()
    }

    /// Switch to the text view, regenerating it from the canvas.
    pub fn activate_text(&mut self) -> bool {
        self.controller.activate(ActiveView::Text) != Transition::Unchanged
    }

    /// Switch to the canvas, rebuilding it from text. Returns JSON
    /// `{"changed":bool,"skipped":n}`.
    pub fn activate_visual(&mut self) -> String {
        let transition = self.controller.activate(ActiveView::Visual);
        transition_json(transition)
    }

    pub fn toggle_view(&mut self) -> String {
        let transition = self.controller.toggle_view();
        transition_json(transition)
    }

    pub fn active_view(&self) -> String {
        view_name(self.controller.active_view()).to_string()
    }

    // ─── Canvas edits ────────────────────────────────────────────────────

    /// Append an operation of `kind` on `track`. Returns the new id, or an
    /// empty string if the kind is unknown or the canvas is not live.
    pub fn add_operation(&mut self, kind: &str, track: usize) -> String {
        let Some(kind) = GateKind::from_name(kind) else {
            log::warn!("unknown operation kind {kind:?}");
            return String::new();
        };
        match self
            .controller
            .apply_mutation(CircuitMutation::AddOperation(NewOperation::new(kind, track)))
        {
            Ok(Some(id)) => id.as_str().to_string(),
            _ => String::new(),
        }
    }

    /// Grow or shrink the register.
    pub fn set_track_count(&mut self, count: usize) -> bool {
        self.controller
            .apply_mutation(CircuitMutation::SetTrackCount { count })
            .is_ok()
    }

    /// Delete the selected operations. Returns true if any was deleted.
    pub fn delete_selected(&mut self) -> bool {
        matches!(self.controller.delete_selected(), Ok(n) if n > 0)
    }

    pub fn selected_ids_json(&self) -> String {
        let ids: Vec<&str> = self.controller.selection().iter().map(|id| id.as_str()).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Handle pointer down. Returns true if the circuit or selection changed.
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.dispatch(InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.dispatch(InputEvent::PointerMove { x, y, modifiers })
    }

    /// Handle pointer up. A palette gesture switches back to select.
    pub fn pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        let changed = self.dispatch(InputEvent::PointerUp { x, y, modifiers });
        if self.active_tool != ToolKind::Select {
            self.set_tool("select");
        }
        changed
    }

    // ─── Tools and shortcuts ─────────────────────────────────────────────

    /// `"select"` or an operation kind name such as `"cnot"`.
    pub fn set_tool(&mut self, name: &str) {
        self.active_tool = match GateKind::from_name(name) {
            Some(kind) => {
                self.palette_tool = PaletteTool::new(kind);
                ToolKind::Palette(kind)
            }
            None => ToolKind::Select,
        };
    }

    pub fn get_tool_name(&self) -> String {
        match self.active_tool {
            ToolKind::Select => "select".to_string(),
            ToolKind::Palette(kind) => kind.name().to_string(),
        }
    }

    /// Handle a keyboard event. Returns JSON
    /// `{"changed":bool,"action":"<name>","tool":"<name>"}`. A `"run"`
    /// action is the page's cue to post `request_json()` to the engine.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, &modifiers(shift, ctrl, alt, meta)) else {
            return r#"{"changed":false,"action":"none","tool":""}"#.to_string();
        };

        let changed = match action {
            ShortcutAction::SelectTool => {
                self.set_tool("select");
                false
            }
            ShortcutAction::Palette(kind) => {
                self.set_tool(kind.name());
                false
            }
            ShortcutAction::DeleteSelected => self.delete_selected(),
            ShortcutAction::Deselect => self
                .controller
                .apply_mutation(CircuitMutation::ClearSelection)
                .is_ok(),
            ShortcutAction::ToggleView => self.controller.toggle_view() != Transition::Unchanged,
            ShortcutAction::Run => false,
        };

        serde_json::json!({
            "changed": changed,
            "action": action_name(action),
            "tool": self.get_tool_name(),
        })
        .to_string()
    }

    // ─── Read-only views ─────────────────────────────────────────────────

    /// Resolved canvas layout: tracks, placed operations, connectors.
    pub fn layout_json(&self) -> String {
        serde_json::to_string(&self.controller.layout()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Body for `POST /execute`, built from the live view.
    pub fn request_json(&self) -> String {
        let request = ExecutionRequest::from_controller(&self.controller, &self.config);
        serde_json::to_string(&request).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set_shots(&mut self, shots: u32) {
        self.config.shots = shots;
    }

    /// Preferred engine backend; an empty string lets the engine choose.
    pub fn set_backend(&mut self, backend: &str) {
        self.config.backend = (!backend.is_empty()).then(|| backend.to_string());
    }

    /// Skipped lines and lint findings for the live view, as a JSON array.
    pub fn diagnostics_json(&self) -> String {
        let mut out: Vec<DiagnosticJson> = Vec::new();
        match self.controller.active_view() {
            ActiveView::Text => {
                let parsed = parse_program_with(self.controller.text(), self.controller.geometry());
                out.extend(parsed.diagnostics.iter().map(DiagnosticJson::skipped));
                out.extend(lint_program(&parsed).iter().map(DiagnosticJson::lint));
            }
            ActiveView::Visual => {
                out.extend(self.controller.diagnostics().iter().map(DiagnosticJson::skipped));
                let lint = lint_circuit(self.controller.circuit());
                out.extend(lint.iter().map(DiagnosticJson::lint));
            }
        }
        serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
    }
}

impl QwCanvas {
    fn dispatch(&mut self, event: InputEvent) -> bool {
        let selection_before = self.controller.selection().len();
        let tool: &mut dyn Tool = match self.active_tool {
            ToolKind::Select => &mut self.select_tool,
            ToolKind::Palette(_) => &mut self.palette_tool,
        };
        match self.controller.dispatch(tool, &event) {
            Ok(added) => {
                !added.is_empty()
                    || self.select_tool.dragging().is_some()
                    || self.controller.selection().len() != selection_before
            }
            Err(e) => {
                log::debug!("ignored pointer input: {e}");
                false
            }
        }
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DiagnosticJson {
    source: &'static str,
    severity: &'static str,
    message: String,
    /// 1-based line for skipped lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    /// Operation id for lint findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    op: Option<String>,
}

impl DiagnosticJson {
    fn skipped(diag: &ParseDiagnostic) -> Self {
        Self {
            source: "parse",
            severity: "warning",
            message: diag.reason.to_string(),
            line: Some(diag.line),
            op: None,
        }
    }

    fn lint(diag: &LintDiagnostic) -> Self {
        Self {
            source: diag.rule,
            severity: match diag.severity {
                LintSeverity::Warning => "warning",
                LintSeverity::Info => "info",
            },
            message: diag.message.clone(),
            line: None,
            op: diag.op.map(|id| id.as_str().to_string()),
        }
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn view_name(view: ActiveView) -> &'static str {
    match view {
        ActiveView::Visual => "visual",
        ActiveView::Text => "text",
    }
}

fn transition_json(transition: Transition) -> String {
    let skipped = match transition {
        Transition::CircuitRebuilt { skipped } => skipped,
        _ => 0,
    };
    serde_json::json!({
        "changed": transition != Transition::Unchanged,
        "skipped": skipped,
    })
    .to_string()
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::SelectTool => "toolSelect",
        ShortcutAction::Palette(_) => "toolPalette",
        ShortcutAction::DeleteSelected => "delete",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::ToggleView => "toggleView",
        ShortcutAction::Run => "run",
    }
}
