//! Engine response bodies.
//!
//! Decoding is lenient: missing collections default to empty, and complex
//! amplitudes are accepted as `[re, im]`, `{"real": .., "imag": ..}` or a
//! bare real number.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Envelope returned by `POST /execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub success: bool,
    #[serde(default)]
    pub result: Option<ExecutionResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Statevector,
    DensityMatrix,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// One map per shot, classical bit → outcome.
    #[serde(default)]
    pub measurements: Vec<BTreeMap<String, i64>>,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub probabilities: Vec<f64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub state_type: Option<StateKind>,
    #[serde(default)]
    pub amplitudes: Option<Vec<Complex>>,
    #[serde(default)]
    pub diagonal: Option<Vec<f64>>,
    #[serde(default)]
    pub state_dim: Option<usize>,
    #[serde(default)]
    pub state_history_length: Option<usize>,
}

// ─── Complex amplitudes ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireComplex")]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }

    pub fn arg(&self) -> f64 {
        self.im.atan2(self.re)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireComplex {
    Pair([f64; 2]),
    Object {
        #[serde(alias = "re")]
        real: f64,
        #[serde(alias = "im", alias = "imaginary")]
        imag: f64,
    },
    Real(f64),
}

impl From<WireComplex> for Complex {
    fn from(wire: WireComplex) -> Self {
        match wire {
            WireComplex::Pair([re, im]) => Complex::new(re, im),
            WireComplex::Object { real, imag } => Complex::new(real, imag),
            WireComplex::Real(re) => Complex::new(re, 0.0),
        }
    }
}

// ─── Auxiliary endpoints ─────────────────────────────────────────────────

/// Body returned by `POST /api/visualize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visualization {
    Bloch {
        qubit: usize,
        vector: [f64; 3],
    },
    DensityMatrix {
        real: Vec<Vec<f64>>,
        imaginary: Vec<Vec<f64>>,
    },
    Histogram {
        counts: BTreeMap<String, u64>,
        probabilities: Vec<f64>,
    },
}

/// Body returned by `GET /api/metrics/entanglement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntanglementMetrics {
    pub total_entropy: f64,
    #[serde(default)]
    pub pairwise_mutual_information: Vec<Vec<f64>>,
}

/// Body returned by `GET /backends`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendList {
    #[serde(default)]
    pub backends: BTreeMap<String, serde_json::Value>,
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
