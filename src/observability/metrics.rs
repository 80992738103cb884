//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method and status
//! - `api_request_duration_seconds` (histogram): latency distribution
//! - `editor_connections` (gauge): live WebSocket connections
//! - `translation_locks_held` (gauge): live lock records
//! - `content_cache_lookups_total` (counter): cache hits/misses by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(%error, "failed to install metrics exporter"),
    }
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("api_requests_total", &labels).increment(1);
    metrics::histogram!("api_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record the current number of live WebSocket connections.
pub fn record_ws_connections(count: usize) {
    metrics::gauge!("editor_connections").set(count as f64);
}

/// Record the current number of held translation locks.
pub fn record_locks_held(count: usize) {
    metrics::gauge!("translation_locks_held").set(count as f64);
}

/// Record a content cache lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("content_cache_lookups_total", "result" => result).increment(1);
}
