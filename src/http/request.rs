//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate and propagate `x-request-id` (UUID v4)
//! - Open the per-request span for traced routes
//! - Derive the [`RequestContext`] handed to the quote service

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

use crate::observability::Tracer;
use crate::quoting::RequestContext;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Assigns a request id when the client did not send one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Build the span for one traced HTTP request.
pub fn make_request_span(tracer: &Tracer, request: &Request<Body>) -> Span {
    let operation = format!("{} {}", request.method(), request.uri().path());
    let span = tracer.server_span("http", &operation);

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::debug!(parent: &span, request_id, "request started");

    span
}

/// Context for a quote request: the current request span, the inbound trace,
/// and a deadline of `timeout`.
pub fn request_context(tracer: &Tracer, headers: &HeaderMap, timeout: Duration) -> RequestContext {
    let trace = tracer.extract(headers);
    let span = Span::current();
    tracer.record_trace(&span, &trace);
    RequestContext::new(span, trace).with_timeout(timeout)
}
