//! Run orchestration and stale-response handling.
//!
//! A run is split in three so callers can overlap runs without holding the
//! session across the network await:
//!
//! 1. [`Session::begin`] snapshots the live program and issues a [`RequestId`].
//! 2. [`Session::perform`] talks to the engine (`&self` only).
//! 3. [`Session::complete`] stores the report if no newer run has begun.
//!
//! In-flight runs are never cancelled; a completion for anything but the
//! newest id is dropped.

use qw_editor::sync::SyncController;

use crate::client::Engine;
use crate::config::EngineConfig;
use crate::display::ExecutionOutcome;
use crate::request::{ExecutionRequest, VisualizationRequest};
use crate::response::{EntanglementMetrics, Visualization};

/// Track whose Bloch vector is fetched after a successful run.
pub const BLOCH_TRACK: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Keeps only the response to the newest request.
#[derive(Debug)]
pub struct RequestTracker<T> {
    latest: u64,
    current: Option<(RequestId, T)>,
}

impl<T> Default for RequestTracker<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            current: None,
        }
    }
}

impl<T> RequestTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id; every earlier id becomes stale.
    pub fn begin(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }

    /// Store `value` if `id` is still the newest request.
    pub fn accept(&mut self, id: RequestId, value: T) -> bool {
        if !self.is_current(id) {
            log::debug!("discarding stale response {id:?}, latest is {}", self.latest);
            return false;
        }
        self.current = Some((id, value));
        true
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref().map(|(_, value)| value)
    }
}

/// Everything the results panels show for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: ExecutionOutcome,
    pub bloch: Option<Visualization>,
    pub entanglement: Option<EntanglementMetrics>,
}

pub struct Session<E: Engine> {
    engine: E,
    config: EngineConfig,
    tracker: RequestTracker<RunReport>,
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E, config: EngineConfig) -> Self {
        Self {
            engine,
            config,
            tracker: RequestTracker::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The newest accepted report.
    pub fn latest(&self) -> Option<&RunReport> {
        self.tracker.current()
    }

    pub fn begin(&mut self, controller: &SyncController) -> (RequestId, ExecutionRequest) {
        let request = ExecutionRequest::from_controller(controller, &self.config);
        (self.tracker.begin(), request)
    }

    /// Execute `request`, then fetch auxiliary panels if it succeeded.
    /// Never fails: engine errors become [`ExecutionOutcome::Failed`] and
    /// auxiliary errors leave their panel empty.
    pub async fn perform(&self, request: &ExecutionRequest) -> RunReport {
        let outcome = match self.engine.execute(request).await {
            Ok(response) => ExecutionOutcome::from_response(response),
            Err(err) => {
                log::warn!("execution failed: {err}");
                ExecutionOutcome::failed(&err)
            }
        };

        if !outcome.is_completed() {
            return RunReport {
                outcome,
                bloch: None,
                entanglement: None,
            };
        }

        let bloch_request = VisualizationRequest::bloch(request.dsl_code.clone(), BLOCH_TRACK);
        let (bloch, entanglement) = tokio::join!(
            self.engine.visualize(&bloch_request),
            self.engine.entanglement_metrics(&request.dsl_code),
        );

        RunReport {
            outcome,
            bloch: bloch
                .inspect_err(|err| log::warn!("bloch vector unavailable: {err}"))
                .ok(),
            entanglement: entanglement
                .inspect_err(|err| log::warn!("entanglement metrics unavailable: {err}"))
                .ok(),
        }
    }

    /// Returns whether `report` was kept.
    pub fn complete(&mut self, id: RequestId, report: RunReport) -> bool {
        self.tracker.accept(id, report)
    }

    /// Begin, perform and complete in one go.
    pub async fn run(&mut self, controller: &SyncController) -> Option<&RunReport> {
        let (id, request) = self.begin(controller);
        let report = self.perform(&request).await;
        if self.complete(id, report) {
            self.latest()
        } else {
            None
        }
    }
}
