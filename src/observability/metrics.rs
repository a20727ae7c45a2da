//! Metrics collection and exposition.
//!
//! # Metrics
//! - `livestatus_queries_total` (counter): queries by table and reply status
//! - `livestatus_query_duration_seconds` (histogram): end-to-end latency by table
//! - `livestatus_errors_total` (counter): bridge failures by kind
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed query.
pub fn record_query(table: &str, status: u16, start: Instant) {
    counter!(
        "livestatus_queries_total",
        "table" => table.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("livestatus_query_duration_seconds", "table" => table.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a bridge failure.
pub fn record_error(kind: &'static str) {
    counter!("livestatus_errors_total", "kind" => kind).increment(1);
}
