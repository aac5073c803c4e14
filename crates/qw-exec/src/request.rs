//! Request bodies sent to the engine.

use serde::{Deserialize, Serialize};

use qw_editor::sync::{CanonicalProgram, SyncController};

use crate::config::EngineConfig;

/// Body of `POST /execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub dsl_code: String,
    pub num_qubits: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub shots: u32,
    #[serde(default)]
    pub return_state_history: bool,
}

impl ExecutionRequest {
    pub fn new(program: CanonicalProgram, config: &EngineConfig) -> Self {
        Self {
            dsl_code: program.text,
            num_qubits: program.track_count,
            backend: config.backend.clone(),
            shots: config.shots,
            return_state_history: config.return_state_history,
        }
    }

    /// Build from whatever view is live, without switching views.
    pub fn from_controller(controller: &SyncController, config: &EngineConfig) -> Self {
        Self::new(controller.canonical(), config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    Bloch,
    Density,
    Histogram,
}

/// Body of `POST /api/visualize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRequest {
    pub circuit_dsl: String,
    pub visualization_type: VisualizationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubit: Option<usize>,
}

impl VisualizationRequest {
    pub fn bloch(circuit_dsl: impl Into<String>, qubit: usize) -> Self {
        Self {
            circuit_dsl: circuit_dsl.into(),
            visualization_type: VisualizationKind::Bloch,
            qubit: Some(qubit),
        }
    }
}
