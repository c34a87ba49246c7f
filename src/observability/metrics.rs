//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests seen by the gate, by route class
//! - `gate_rejections_total` (counter): terminal rejections, by reason
//! - `gate_upstream_duration_seconds` (histogram): upstream latency, by status
//! - `gate_tracked_clients` (gauge): client keys held by the limiter
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(class: &'static str) {
    counter!("gate_requests_total", "class" => class).increment(1);
}

pub fn record_rejection(reason: &'static str) {
    counter!("gate_rejections_total", "reason" => reason).increment(1);
}

pub fn record_upstream(status: u16, start: Instant) {
    histogram!("gate_upstream_duration_seconds", "status" => status.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn set_tracked_clients(count: usize) {
    gauge!("gate_tracked_clients").set(count as f64);
}
