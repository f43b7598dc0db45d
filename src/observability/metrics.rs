//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, branch
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//!
//! The `branch` label records how the response was relayed: `json`,
//! `binary`, `raw` (unparseable JSON fallback) or `error`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener.
///
/// Failure to install is logged, not fatal; the gateway keeps serving.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

/// Record one completed proxied request.
pub fn record_request(method: &str, status: u16, branch: &'static str, started: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "branch" => branch,
    )
    .increment(1);

    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
    )
    .record(started.elapsed().as_secs_f64());
}
