//! Engine connection settings.

use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Engine URL used when `QW_ENGINE_URL` is unset.
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8000";

/// Shots per run when `QW_SHOTS` is unset.
pub const DEFAULT_SHOTS: u32 = 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Preferred simulation backend; `None` lets the engine choose.
    pub backend: Option<String>,
    pub shots: u32,
    pub timeout: Duration,
    pub return_state_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            backend: None,
            shots: DEFAULT_SHOTS,
            timeout: DEFAULT_TIMEOUT,
            return_state_history: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `QW_ENGINE_URL`, `QW_BACKEND`, `QW_SHOTS`
    /// and `QW_TIMEOUT_SECS`.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("QW_ENGINE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(backend) = lookup("QW_BACKEND").filter(|b| !b.trim().is_empty()) {
            config.backend = Some(backend);
        }
        if let Some(shots) = lookup("QW_SHOTS") {
            config.shots = parse_var("QW_SHOTS", shots)?;
        }
        if let Some(secs) = lookup("QW_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var("QW_TIMEOUT_SECS", secs)?);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> EngineResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EngineError::Config { key, value })
}
