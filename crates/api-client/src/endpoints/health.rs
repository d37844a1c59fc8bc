//! Health check endpoints

use crate::client::WorkOrderClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Health check API interface
#[derive(Clone)]
pub struct HealthApi {
    client: WorkOrderClient,
}

impl HealthApi {
    pub(crate) fn new(client: WorkOrderClient) -> Self {
        Self { client }
    }

    /// GET /health
    pub async fn check(&self) -> ApiResult<HealthResponse> {
        self.client.get("/health").await
    }

    /// GET /health with timing information
    pub async fn check_timed(&self) -> ApiResult<(HealthResponse, Duration)> {
        let start = Instant::now();
        let response = self.check().await?;
        Ok((response, start.elapsed()))
    }

    /// GET / (service name and version)
    pub async fn info(&self) -> ApiResult<ServiceInfo> {
        self.client.get("/").await
    }
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status, `healthy` when up
    pub status: String,
}

impl HealthResponse {
    /// Whether the backend reports itself healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.to_ascii_lowercase().as_str(), "healthy" | "ok")
    }
}

/// Root endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub message: String,
    /// Backend version
    pub version: String,
}
