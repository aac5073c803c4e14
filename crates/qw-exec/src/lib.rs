//! Execution adapter for QW circuits.
//!
//! Builds engine requests from the live editor view, talks to the engine's
//! REST API, and turns raw results into display models.

#[cfg(feature = "http")]
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod request;
pub mod response;
#[cfg(feature = "http")]
pub mod session;

#[cfg(feature = "http")]
pub use client::{Engine, HttpEngine};
pub use config::{DEFAULT_SHOTS, EngineConfig};
pub use display::{DisplayModel, ExecutionOutcome};
pub use error::{EngineError, EngineResult};
pub use request::{ExecutionRequest, VisualizationKind, VisualizationRequest};
pub use response::{
    Complex, EngineResponse, EntanglementMetrics, ExecutionResult, StateKind, Visualization,
};
#[cfg(feature = "http")]
pub use session::{RequestId, RequestTracker, RunReport, Session};
