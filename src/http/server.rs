//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request id, tracing, security headers)
//! - Serve on a bound listener until the shutdown signal fires
//!
//! # Routes
//! - `/healthz`, `/servez`: liveness/readiness, no span, no access log
//! - `/metrics`: Prometheus exposition (only when metrics are enabled)
//! - `/`, `/json`: the quote, traced and access-logged

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::{FailurePolicy, ResponseFormat, ServerConfig};
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::observability::Tracer;
use crate::quoting::QuoteService;
use crate::security::headers::with_security_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: QuoteService,
    pub tracer: Tracer,
    pub response_format: ResponseFormat,
    pub failure_policy: FailurePolicy,
    pub request_timeout: Duration,
}

/// HTTP frontend.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: &ServerConfig,
        service: QuoteService,
        tracer: Tracer,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let state = AppState {
            service,
            tracer,
            response_format: config.http.response_format,
            failure_policy: config.failure_policy,
            request_timeout: Duration::from_secs(config.http.request_timeout_secs),
        };

        let router = Self::build_router(config, state, metrics);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ServerConfig,
        state: AppState,
        metrics: Option<PrometheusHandle>,
    ) -> Router {
        let tracer = state.tracer.clone();
        let traced = Router::new()
            .route("/", get(handlers::quote))
            .route("/json", get(handlers::quote_json))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(move |request: &Request<Body>| make_request_span(&tracer, request))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer());

        let mut router = Router::new()
            .route("/healthz", get(handlers::health))
            .route("/servez", get(handlers::health))
            .merge(traced);

        if let Some(handle) = metrics {
            router = router.route("/metrics", get(handlers::metrics_scrape).with_state(handle));
        }

        let router = router.with_state(state);

        if config.security.enable_headers {
            with_security_headers(router)
        } else {
            router
        }
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
