//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define application metrics (requests, latency, sessions)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `webapp_requests_total` (counter): total requests by method, route, status
//! - `webapp_request_duration_seconds` (histogram): latency distribution
//! - `webapp_active_sessions` (gauge): sessions held by the store
//!
//! # Design Decisions
//! - Route label is the matched pattern, never the raw path, to bound cardinality
//! - Histogram buckets tuned for typical web latencies

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

const REQUESTS_TOTAL: &str = "webapp_requests_total";
const REQUEST_DURATION: &str = "webapp_request_duration_seconds";
const ACTIVE_SESSIONS: &str = "webapp_active_sessions";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must run inside a Tokio runtime; the exporter spawns its HTTP listener
/// on it.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install()?;

    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION, "Time spent dispatching a request");
    describe_gauge!(ACTIVE_SESSIONS, "Sessions currently held by the store");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "method" => method.to_string(), "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Publish the current session count.
pub fn record_active_sessions(count: usize) {
    gauge!(ACTIVE_SESSIONS).set(count as f64);
}
