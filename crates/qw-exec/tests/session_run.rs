//! Integration tests: run orchestration against an in-memory engine.

#![cfg(feature = "http")]

use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use qw_core::layout::{NewOperation, TrackGeometry};
use qw_core::model::GateKind;
use qw_editor::sync::{ActiveView, CircuitMutation, SyncController};
use qw_exec::response::{
    EngineResponse, EntanglementMetrics, ExecutionResult, StateKind, Visualization,
};
use qw_exec::{
    Complex, EngineConfig, EngineError, EngineResult, ExecutionOutcome, ExecutionRequest, Session,
    VisualizationRequest,
};

/// Answers from canned values and records every execution request.
struct FakeEngine {
    fail_execute: bool,
    fail_aux: bool,
    seen: Mutex<Vec<ExecutionRequest>>,
}

impl FakeEngine {
    fn new() -> Self {
        Self {
            fail_execute: false,
            fail_aux: false,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl qw_exec::Engine for FakeEngine {
    async fn execute(&self, request: &ExecutionRequest) -> EngineResult<EngineResponse> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail_execute {
            return Ok(EngineResponse {
                success: false,
                result: None,
                error: Some("Unknown gate: foo".into()),
            });
        }
        Ok(EngineResponse {
            success: true,
            result: Some(ExecutionResult {
                state_type: Some(StateKind::Statevector),
                amplitudes: Some(vec![
                    Complex::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
                    Complex::new(0.0, 0.0),
                    Complex::new(0.0, 0.0),
                    Complex::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
                ]),
                ..ExecutionResult::default()
            }),
            error: None,
        })
    }

    async fn visualize(&self, request: &VisualizationRequest) -> EngineResult<Visualization> {
        if self.fail_aux {
            return Err(EngineError::Api {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(Visualization::Bloch {
            qubit: request.qubit.unwrap_or(0),
            vector: [0.0, 0.0, 0.0],
        })
    }

    async fn entanglement_metrics(&self, _circuit_dsl: &str) -> EngineResult<EntanglementMetrics> {
        if self.fail_aux {
            return Err(EngineError::Engine("metrics unavailable".into()));
        }
        Ok(EntanglementMetrics {
            total_entropy: 1.0,
            pairwise_mutual_information: vec![vec![0.0, 2.0], vec![2.0, 0.0]],
        })
    }
}

fn bell_controller() -> SyncController {
    SyncController::from_text(include_str!("fixtures/bell.qw"), TrackGeometry::default())
}

#[tokio::test]
async fn successful_run_fills_every_panel() {
    let mut session = Session::new(FakeEngine::new(), EngineConfig::default());
    let report = session.run(&bell_controller()).await.unwrap();

    let ExecutionOutcome::Completed(model) = &report.outcome else {
        panic!("expected completed outcome, got {:?}", report.outcome);
    };
    assert_eq!(model.probabilities.len(), 4);
    assert!((model.probabilities[0] - 0.5).abs() < 1e-9);
    assert!(matches!(report.bloch, Some(Visualization::Bloch { qubit: 0, .. })));
    assert_eq!(report.entanglement.as_ref().unwrap().total_entropy, 1.0);
}

#[tokio::test]
async fn request_carries_live_text_and_track_count() {
    let mut session = Session::new(FakeEngine::new(), EngineConfig::default());
    let mut controller = bell_controller();
    controller.activate(ActiveView::Visual);
    controller
        .apply_mutation(CircuitMutation::AddOperation(NewOperation::new(GateKind::Measure, 1)))
        .unwrap();
    controller
        .apply_mutation(CircuitMutation::SetTrackCount { count: 3 })
        .unwrap();

    session.run(&controller).await;

    let seen = session.engine().seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.num_qubits, 3);
    assert_eq!(request.dsl_code, "declare q[3]\nh(0)\ncnot(0, 1)\nmeasure(1)\n");
    assert_eq!(request.shots, 1024);
}

#[tokio::test]
async fn engine_failure_is_reported_without_aux_fetches() {
    let engine = FakeEngine {
        fail_execute: true,
        ..FakeEngine::new()
    };
    let mut session = Session::new(engine, EngineConfig::default());
    let report = session.run(&bell_controller()).await.unwrap();

    assert_eq!(
        report.outcome,
        ExecutionOutcome::Failed {
            message: "Unknown gate: foo".into()
        }
    );
    assert_eq!(report.bloch, None);
    assert_eq!(report.entanglement, None);
}

#[tokio::test]
async fn aux_failures_leave_primary_result_intact() {
    let engine = FakeEngine {
        fail_aux: true,
        ..FakeEngine::new()
    };
    let mut session = Session::new(engine, EngineConfig::default());
    let report = session.run(&bell_controller()).await.unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.bloch, None);
    assert_eq!(report.entanglement, None);
}

#[tokio::test]
async fn stale_completion_is_discarded() {
    let mut session = Session::new(FakeEngine::new(), EngineConfig::default());
    let controller = bell_controller();

    let (older, request) = session.begin(&controller);
    let older_report = session.perform(&request).await;

    let (newer, request) = session.begin(&controller);
    let newer_report = session.perform(&request).await;

    assert!(session.complete(newer, newer_report.clone()));
    assert!(!session.complete(older, older_report));
    assert_eq!(session.latest(), Some(&newer_report));
}
