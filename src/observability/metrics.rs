//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lotus_config_reloads_total` (counter): reload attempts by outcome
//!   (`reloaded`, `failed`)
//! - `lotus_config_events_filtered_total` (counter): change events dropped by
//!   the debounce gate before any attempt
//! - `lotus_config_generation` (gauge): successful swaps since startup
//! - `lotus_http_requests_total` (counter): requests by path
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is only installed when an address is configured

use std::net::SocketAddr;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the result of one reload attempt.
pub fn record_reload(outcome: &'static str) {
    metrics::counter!("lotus_config_reloads_total", "outcome" => outcome).increment(1);
}

/// Record a change event that the debounce gate suppressed.
pub fn record_filtered_event() {
    metrics::counter!("lotus_config_events_filtered_total").increment(1);
}

/// Record the publisher generation after a swap.
pub fn record_generation(generation: u64) {
    metrics::gauge!("lotus_config_generation").set(generation as f64);
}

pub fn record_request(path: &str) {
    metrics::counter!("lotus_http_requests_total", "path" => path.to_string()).increment(1);
}
