//! Prometheus metrics for scrapbook-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const LAYERS_TOTAL: &str = "scrapbook_layers_total";
const GESTURES_TOTAL: &str = "scrapbook_gestures_total";
const COLLABORATOR_CALLS_TOTAL: &str = "scrapbook_collaborator_calls_total";
const VALIDATION_FAILURES_TOTAL: &str = "scrapbook_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Update the layer count.
#[allow(clippy::cast_precision_loss)]
pub fn set_layers(count: usize) {
    gauge!(LAYERS_TOTAL).set(count as f64);
}

/// Record the start of a gesture.
///
/// # Arguments
///
/// * `kind` - "drag" or "scale"
pub fn record_gesture(kind: &'static str) {
    counter!(GESTURES_TOTAL, "kind" => kind).increment(1);
}

/// Record a call to a downstream collaborator.
///
/// # Arguments
///
/// * `service` - "prompt", "saliency" or "synthesis"
/// * `success` - Whether the call succeeded
pub fn record_collaborator_call(service: &'static str, success: bool) {
    counter!(
        COLLABORATOR_CALLS_TOTAL,
        "service" => service,
        "success" => success.to_string()
    )
    .increment(1);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (caption, upload, layer_count, prompt)
pub fn record_validation_failure(validation_type: &'static str) {
    counter!(VALIDATION_FAILURES_TOTAL, "type" => validation_type).increment(1);
}
