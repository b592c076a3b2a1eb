//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pool_selections_total` (counter): selections by pool, outcome (hit/miss)
//! - `pool_marks_total` (counter): health reports by kind
//! - `pool_candidates_available` (gauge): available candidates at last stats call

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_selection(pool: &str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("pool_selections_total", "pool" => pool.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_mark(kind: &'static str) {
    counter!("pool_marks_total", "kind" => kind).increment(1);
}

pub fn record_available(pool: &str, available: usize) {
    gauge!("pool_candidates_available", "pool" => pool.to_string()).set(available as f64);
}
