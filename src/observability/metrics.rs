//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency by method, route
//! - `route_registrations_total` (counter): startup registrations by method, outcome
//! - `generation_requests_total` (counter): structured generation calls by schema, outcome

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_registration(method: &str, outcome: &'static str) {
    counter!(
        "route_registrations_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_generation(schema: &'static str, outcome: &'static str) {
    counter!("generation_requests_total", "schema" => schema, "outcome" => outcome).increment(1);
}
