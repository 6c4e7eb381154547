//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_session_validations_total` (counter): session checks by outcome
//! - `relay_session_validation_duration_seconds` (histogram)
//! - `relay_storage_requests_total` (counter): storage calls by operation, outcome
//! - `relay_storage_request_duration_seconds` (histogram): by operation
//! - `relay_orphaned_files_total` (counter): old files left behind by updates
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_session_outcome(outcome: &'static str, start: Instant) {
    counter!("relay_session_validations_total", "outcome" => outcome).increment(1);
    histogram!("relay_session_validation_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_storage_call(operation: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "relay_storage_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("relay_storage_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_orphaned_file() {
    counter!("relay_orphaned_files_total").increment(1);
}
