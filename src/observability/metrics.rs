//! Metrics collection and exposition.
//!
//! # Metrics
//! - `locale_requests_total` (counter): dispatched requests by method, status, route
//! - `locale_request_duration_seconds` (histogram): dispatch latency
//! - `locale_redirects_total` (counter): locale repair redirects by reason
//! - `locale_prefix_cache_entries` (gauge): compiled country prefix matchers
//! - `locale_config_reloads_total` (counter): reloads by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "locale_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("locale_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_locale_redirect(reason: &'static str) {
    counter!("locale_redirects_total", "reason" => reason).increment(1);
}

pub fn record_prefix_cache_size(entries: usize) {
    gauge!("locale_prefix_cache_entries").set(entries as f64);
}

pub fn record_config_reload(outcome: &'static str) {
    counter!("locale_config_reloads_total", "outcome" => outcome).increment(1);
}
