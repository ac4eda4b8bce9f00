//! Metrics collection and exposition.
//!
//! # Metrics
//! - `node_height` (gauge): last height reported by the endpoint
//! - `node_polls_total` (counter): heartbeat polls by `result` (ok, error)
//! - `node_failures_recorded_total` (counter): entries added to the failure log
//! - `node_running` (gauge): 1 while the heartbeat runs, 0 after shutdown
//!
//! All metrics carry an `endpoint` label. Without an installed recorder the
//! macros are no-ops.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record the outcome of one heartbeat poll. `None` means the poll failed.
pub fn record_poll(endpoint: &str, height: Option<u64>) {
    let result = if height.is_some() { "ok" } else { "error" };
    metrics::counter!("node_polls_total", "endpoint" => endpoint.to_string(), "result" => result)
        .increment(1);

    if let Some(height) = height {
        metrics::gauge!("node_height", "endpoint" => endpoint.to_string()).set(height as f64);
    }
}

pub fn record_failure(endpoint: &str) {
    metrics::counter!("node_failures_recorded_total", "endpoint" => endpoint.to_string())
        .increment(1);
}

pub fn record_running(endpoint: &str, running: bool) {
    let value = if running { 1.0 } else { 0.0 };
    metrics::gauge!("node_running", "endpoint" => endpoint.to_string()).set(value);
}
