//! Metrics collection and exposition.
//!
//! # Metrics
//! - `secure_host_rejected_total` (counter): requests refused by the host allow-list
//! - `secure_https_redirects_total` (counter): insecure requests redirected to https
//! - `secure_policy_reloads_total` (counter): policy reloads by outcome
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so the middleware
//!   can always record

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_host_rejected() {
    metrics::counter!("secure_host_rejected_total").increment(1);
}

pub fn record_https_redirect() {
    metrics::counter!("secure_https_redirects_total").increment(1);
}

pub fn record_policy_reload(applied: bool) {
    let outcome = if applied { "applied" } else { "rejected" };
    metrics::counter!("secure_policy_reloads_total", "outcome" => outcome).increment(1);
}
