//! Health check endpoints for Kubernetes probes.
//!
//! Provides liveness and readiness probes for container orchestration:
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe (remove from LB if fails)
//! - `/health` - Combined check for backward compatibility

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// How long readiness waits for the session lock.
const SESSION_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Individual component checks
    pub checks: HealthChecks,
}

/// Individual health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Composition session reachable
    pub session: bool,
    /// Number of layers, when the session was reachable
    pub layers: Option<usize>,
    /// Prompt service has credentials
    pub prompt_service: bool,
    /// Synthesis endpoint configured
    pub synthesis_service: bool,
}

/// Liveness probe - is the server running?
///
/// Returns 200 OK if the process is alive.
/// Kubernetes will restart the pod if this fails.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe - is the server ready to accept traffic?
///
/// Only the session gates readiness; downstream services are optional and
/// reported for information.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let layers = tokio::time::timeout(SESSION_LOCK_TIMEOUT, state.composer().lock())
        .await
        .ok()
        .map(|composer| composer.scene().len());
    let session_ok = layers.is_some();

    let collaborators = state.collaborators();
    let status = HealthStatus {
        status: if session_ok { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            session: session_ok,
            layers,
            prompt_service: collaborators.prompt.is_configured(),
            synthesis_service: collaborators.synthesis.is_configured(),
        },
    };

    let code = if session_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
