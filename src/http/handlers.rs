//! Route handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ResponseFormat;
use crate::http::request::request_context;
use crate::http::response::render;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::quoting::Frontend;

/// `GET /healthz` and `GET /servez`.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /metrics`. Only routed when a recorder is installed.
pub async fn metrics_scrape(State(handle): State<PrometheusHandle>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

/// `GET /`: the quote in the configured format.
pub async fn quote(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_quote(&state, &headers, "/", state.response_format).await
}

/// `GET /json`: the quote as `{"quote": "..."}`.
pub async fn quote_json(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_quote(&state, &headers, "/json", ResponseFormat::Json).await
}

async fn serve_quote(
    state: &AppState,
    headers: &HeaderMap,
    route: &'static str,
    format: ResponseFormat,
) -> Response {
    let start = Instant::now();
    let ctx = request_context(&state.tracer, headers, state.request_timeout);

    let outcome = state.service.get_quote(&ctx, Frontend::Http).await;
    tracing::debug!(outcome = outcome.kind(), "quote resolved");

    let response = render(&outcome, format, state.failure_policy);
    metrics::record_http_request(route, response.status().as_u16(), start);
    response
}
