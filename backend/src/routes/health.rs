//! Health check endpoints
//!
//! - /health - process is up, with build version
//! - /health/ready - credential store answers; 503 otherwise
//! - /health/live - always OK while the server runs

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Alive,
    Ready,
    NotReady,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
    /// Credential store status, readiness only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<HealthStatus>,
}

impl HealthResponse {
    fn bare(status: HealthStatus) -> Self {
        Self {
            status,
            version: None,
            store: None,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        version: Some(env!("CARGO_PKG_VERSION")),
        ..HealthResponse::bare(HealthStatus::Healthy)
    })
}

/// Store errors are logged, not returned to the caller.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.store().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                store: Some(HealthStatus::Healthy),
                ..HealthResponse::bare(HealthStatus::Ready)
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed: credential store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    store: Some(HealthStatus::Unhealthy),
                    ..HealthResponse::bare(HealthStatus::NotReady)
                }),
            )
        }
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::bare(HealthStatus::Alive))
}
