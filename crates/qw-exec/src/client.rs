//! Execution engine client.
//!
//! [`Engine`] is the seam between the editor and whatever runs circuits.
//! [`HttpEngine`] talks to the engine's REST API; tests substitute an
//! in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::request::{ExecutionRequest, VisualizationRequest};
use crate::response::{
    BackendList, EngineResponse, EntanglementMetrics, HealthStatus, Visualization,
};

#[async_trait]
pub trait Engine: Send + Sync {
    /// Run a circuit. A reachable engine that fails to run the circuit
    /// still answers `Ok` with `success: false`.
    async fn execute(&self, request: &ExecutionRequest) -> EngineResult<EngineResponse>;

    async fn visualize(&self, request: &VisualizationRequest) -> EngineResult<Visualization>;

    async fn entanglement_metrics(&self, circuit_dsl: &str) -> EngineResult<EntanglementMetrics>;
}

/// REST client for the execution engine.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

impl HttpEngine {
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(EngineError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> EngineResult<T> {
        let resp = self.client.get(self.url(path)).query(query).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> EngineResult<T> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> EngineResult<T> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(EngineError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Backends the engine can simulate with, keyed by name.
    pub async fn list_backends(&self) -> EngineResult<BackendList> {
        log::debug!("listing engine backends");
        self.get("backends", &[]).await
    }

    pub async fn health(&self) -> EngineResult<HealthStatus> {
        self.get("health", &[]).await
    }
}

#[async_trait]
impl Engine for HttpEngine {
    async fn execute(&self, request: &ExecutionRequest) -> EngineResult<EngineResponse> {
        log::debug!(
            "executing {} qubit circuit, {} shots",
            request.num_qubits,
            request.shots
        );
        self.post("execute", request).await
    }

    async fn visualize(&self, request: &VisualizationRequest) -> EngineResult<Visualization> {
        log::debug!("requesting {:?} visualization", request.visualization_type);
        self.post("api/visualize", request).await
    }

    async fn entanglement_metrics(&self, circuit_dsl: &str) -> EngineResult<EntanglementMetrics> {
        self.get("api/metrics/entanglement", &[("circuit_dsl", circuit_dsl)])
            .await
    }
}
