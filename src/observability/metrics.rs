//! Metrics collection and exposition.
//!
//! # Metrics
//! - `provider_fetch_total` (counter): fetches by endpoint, outcome
//! - `provider_fetch_duration_seconds` (histogram): per-endpoint fetch latency
//! - `provider_cycle_duration_seconds` (histogram): full cycle latency
//! - `provider_merged_entities` (gauge): entities in the last merged config, by kind
//! - `provider_merge_conflicts_total` (counter): discarded duplicates, by kind
//! - `provider_emit_total` (counter): emissions by outcome
//!
//! Recording is a no-op until a recorder is installed, so library users
//! and tests pay nothing unless `init_metrics` runs.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_fetch(endpoint: &str, outcome: &'static str, start: Instant) {
    counter!("provider_fetch_total", "endpoint" => endpoint.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("provider_fetch_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cycle(start: Instant) {
    histogram!("provider_cycle_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_merged(routers: usize, services: usize, middlewares: usize) {
    gauge!("provider_merged_entities", "kind" => "routers").set(routers as f64);
    gauge!("provider_merged_entities", "kind" => "services").set(services as f64);
    gauge!("provider_merged_entities", "kind" => "middlewares").set(middlewares as f64);
}

pub fn record_merge_conflict(kind: &'static str) {
    counter!("provider_merge_conflicts_total", "kind" => kind).increment(1);
}

pub fn record_emit(outcome: &'static str) {
    counter!("provider_emit_total", "outcome" => outcome).increment(1);
}
