//! Metrics collection and exposition.
//!
//! # Metrics
//! - `asset_resolutions_total` (counter): by outcome (local, relayed, not_found, error)
//! - `asset_resolution_duration_seconds` (histogram): by outcome
//! - `asset_relay_attempts_total` (counter): by peer and outcome (hit, timeout, ...)
//! - `asset_relay_attempt_duration_seconds` (histogram): by peer

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str, start: Instant) {
    metrics::counter!("asset_resolutions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("asset_resolution_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_relay_attempt(peer: &str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "asset_relay_attempts_total",
        "peer" => peer.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("asset_relay_attempt_duration_seconds", "peer" => peer.to_string())
        .record(start.elapsed().as_secs_f64());
}
