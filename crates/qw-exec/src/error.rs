//! Error types for the execution engine adapter.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur when talking to the execution engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The engine answered but reported a failure of its own.
    #[error("Engine error: {0}")]
    Engine(String),

    /// A configuration value could not be read.
    #[error("Invalid configuration for {key}: {value:?}")]
    Config { key: &'static str, value: String },
}
