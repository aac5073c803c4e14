//! Display-ready execution results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EngineError;
use crate::response::{EngineResponse, ExecutionResult, StateKind};

/// Per-basis-state view of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub state_kind: StateKind,
    /// Amplitude magnitude per basis state.
    pub amplitudes: Vec<f64>,
    /// Amplitude phase per basis state, radians.
    pub phases: Vec<f64>,
    pub probabilities: Vec<f64>,
    pub counts: BTreeMap<String, u64>,
    pub metadata: serde_json::Value,
}

impl DisplayModel {
    pub fn from_result(result: &ExecutionResult) -> Self {
        let state_kind = result.state_type.unwrap_or(if result.diagonal.is_some() {
            StateKind::DensityMatrix
        } else {
            StateKind::Statevector
        });

        let (amplitudes, phases, derived) = match state_kind {
            StateKind::Statevector => {
                let amps = result.amplitudes.as_deref().unwrap_or_default();
                (
                    amps.iter().map(|a| a.norm()).collect(),
                    amps.iter().map(|a| a.arg()).collect(),
                    amps.iter().map(|a| a.norm().powi(2)).collect::<Vec<f64>>(),
                )
            }
            // Off-diagonal terms are not sent, so phase is unknown.
            StateKind::DensityMatrix => {
                let diagonal = result.diagonal.clone().unwrap_or_default();
                (
                    diagonal.iter().map(|p| p.max(0.0).sqrt()).collect(),
                    vec![0.0; diagonal.len()],
                    diagonal,
                )
            }
        };

        let derive_from_state =
            state_kind == StateKind::DensityMatrix || result.probabilities.is_empty();
        let probabilities = if derive_from_state {
            derived
        } else {
            result.probabilities.clone()
        };

        Self {
            state_kind,
            amplitudes,
            phases,
            probabilities,
            counts: result.counts.clone(),
            metadata: result.metadata.clone(),
        }
    }

    pub fn basis_count(&self) -> usize {
        self.probabilities.len()
    }

    /// `|01⟩`-style label for basis state `index`.
    pub fn basis_label(&self, index: usize) -> String {
        let width = self.basis_count().max(2).next_power_of_two().trailing_zeros() as usize;
        format!("|{index:0width$b}⟩")
    }
}

/// What the results panel shows after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Completed(DisplayModel),
    Failed { message: String },
}

impl ExecutionOutcome {
    pub fn from_response(response: EngineResponse) -> Self {
        match (response.success, response.result) {
            (true, Some(result)) => ExecutionOutcome::Completed(DisplayModel::from_result(&result)),
            _ => ExecutionOutcome::Failed {
                message: response
                    .error
                    .unwrap_or_else(|| "engine returned no result".to_string()),
            },
        }
    }

    pub fn failed(err: &EngineError) -> Self {
        ExecutionOutcome::Failed {
            message: err.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Complex;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn statevector_uses_magnitude_and_phase() {
        let result = ExecutionResult {
            state_type: Some(StateKind::Statevector),
            amplitudes: Some(vec![Complex::new(0.6, 0.0), Complex::new(0.0, -0.8)]),
            ..ExecutionResult::default()
        };
        let model = DisplayModel::from_result(&result);
        assert!(close(model.amplitudes[0], 0.6));
        assert!(close(model.amplitudes[1], 0.8));
        assert!(close(model.phases[1], -std::f64::consts::FRAC_PI_2));
        assert!(close(model.probabilities[0], 0.36));
        assert!(close(model.probabilities[1], 0.64));
    }

    #[test]
    fn reported_probabilities_win_for_statevectors() {
        let result = ExecutionResult {
            state_type: Some(StateKind::Statevector),
            amplitudes: Some(vec![Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)]),
            probabilities: vec![0.9, 0.1],
            ..ExecutionResult::default()
        };
        assert_eq!(DisplayModel::from_result(&result).probabilities, vec![0.9, 0.1]);
    }

    #[test]
    fn density_matrix_falls_back_to_diagonal() {
        let result = ExecutionResult {
            state_type: Some(StateKind::DensityMatrix),
            diagonal: Some(vec![0.25, 0.0, 0.0, 0.75]),
            probabilities: vec![1.0, 0.0, 0.0, 0.0],
            ..ExecutionResult::default()
        };
        let model = DisplayModel::from_result(&result);
        assert_eq!(model.probabilities, vec![0.25, 0.0, 0.0, 0.75]);
        assert_eq!(model.amplitudes[0], 0.5);
        assert_eq!(model.phases, vec![0.0; 4]);
        assert_eq!(model.basis_label(3), "|11⟩");
    }

    #[test]
    fn failed_envelope_becomes_failed_outcome() {
        let outcome = ExecutionOutcome::from_response(EngineResponse {
            success: false,
            result: None,
            error: Some("Unknown gate: foo".into()),
        });
        assert_eq!(
            outcome,
            ExecutionOutcome::Failed {
                message: "Unknown gate: foo".into()
            }
        );
    }

    #[test]
    fn success_without_result_is_a_failure() {
        let outcome = ExecutionOutcome::from_response(EngineResponse {
            success: true,
            result: None,
            error: None,
        });
        assert!(!outcome.is_completed());
    }
}
