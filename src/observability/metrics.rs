//! Metrics collection and exposition.
//!
//! # Metrics
//! - `quote_requests_total` (counter): quote requests by frontend and outcome
//! - `quote_upstream_duration_seconds` (histogram): upstream latency by outcome
//! - `http_requests_total` (counter): HTTP requests by route and status
//! - `http_request_duration_seconds` (histogram): HTTP latency by route
//! - `grpc_requests_total` (counter): gRPC calls by method and code
//!
//! The recording functions are no-ops until a recorder is installed, so
//! tests and metrics-disabled deployments pay nothing.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder as the global metrics recorder.
///
/// The returned handle renders the exposition text for `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

fn describe() {
    describe_counter!("quote_requests_total", "Quote requests served, by frontend and outcome");
    describe_histogram!(
        "quote_upstream_duration_seconds",
        Unit::Seconds,
        "Time spent fetching a quote from the upstream provider"
    );
    describe_counter!("http_requests_total", "HTTP requests, by route and status");
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request latency, by route"
    );
    describe_counter!("grpc_requests_total", "gRPC calls, by method and status code");
}

/// Record a served quote request.
pub fn record_quote(frontend: &'static str, outcome: &'static str) {
    counter!("quote_requests_total", "frontend" => frontend, "outcome" => outcome).increment(1);
}

/// Record one upstream fetch.
pub fn record_upstream(outcome: &'static str, start: Instant) {
    histogram!("quote_upstream_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one HTTP request.
pub fn record_http_request(route: &'static str, status: u16, start: Instant) {
    counter!("http_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one gRPC call.
pub fn record_grpc_request(method: &'static str, code: tonic::Code) {
    counter!("grpc_requests_total", "method" => method, "code" => format!("{:?}", code))
        .increment(1);
}
