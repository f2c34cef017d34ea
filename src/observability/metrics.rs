//! Metrics collection and exposition.
//!
//! # Metrics
//! - `version_gate_negotiations_total` (counter): by `outcome`
//!   (unversioned, compatible, incompatible, fault)
//! - `version_gate_responses_total` (counter): by `status`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the outcome of one negotiation.
pub fn record_negotiation(outcome: &'static str) {
    metrics::counter!("version_gate_negotiations_total", "outcome" => outcome).increment(1);
}

/// Record a response leaving the version gate.
pub fn record_response(status: u16) {
    metrics::counter!("version_gate_responses_total", "status" => status.to_string()).increment(1);
}
