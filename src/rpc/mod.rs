//! gRPC frontend.
//!
//! # Data Flow
//! ```text
//! TcpListener (net::bind)
//!     → tonic Server (per-call span, concurrency limit)
//!     → service.rs (QuoteRpc::get_quote → QuoteService)
//!
//! Alongside quote.Quote:
//!     grpc.health.v1.Health (tonic-health)
//!     grpc.reflection.v1.ServerReflection (tonic-reflection, descriptor.rs)
//! ```

pub mod descriptor;
pub mod proto;
pub mod service;

use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::codegen::http;
use tonic::transport::Server;
use tonic_health::ServingStatus;

use crate::config::{FailurePolicy, GrpcConfig};
use crate::observability::Tracer;
use crate::quoting::QuoteService;
use proto::quote_server::QuoteServer;
pub use service::QuoteRpc;

/// Health-check name under which the quote service reports.
pub const HEALTH_SERVICE_NAME: &str = "grpc.health.v1.quoteservice";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to build the reflection service: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),
    #[error("gRPC server failed: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// gRPC frontend serving `quote.Quote`, health and reflection.
pub struct RpcServer {
    quote: QuoteRpc,
    tracer: Tracer,
    concurrency_limit_per_connection: usize,
}

impl RpcServer {
    pub fn new(config: &GrpcConfig, service: QuoteService, tracer: Tracer, policy: FailurePolicy) -> Self {
        Self {
            quote: QuoteRpc::new(
                service,
                tracer.clone(),
                policy,
                Duration::from_secs(config.request_timeout_secs),
            ),
            tracer,
            concurrency_limit_per_connection: config.concurrency_limit_per_connection,
        }
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight calls.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), RpcError> {
        let addr = listener.local_addr().ok();

        let (reporter, health) = tonic_health::server::health_reporter();
        reporter.set_serving::<QuoteServer<QuoteRpc>>().await;
        reporter
            .set_service_status(HEALTH_SERVICE_NAME, ServingStatus::Serving)
            .await;

        let reflection = tonic_reflection::server::Builder::configure()
            .register_file_descriptor_set(descriptor::file_descriptor_set())
            .build_v1()?;

        let tracer = self.tracer;
        tracing::info!(address = ?addr, "gRPC server starting");

        Server::builder()
            .trace_fn(move |request: &http::Request<()>| tracer.server_span("grpc", request.uri().path()))
            .concurrency_limit_per_connection(self.concurrency_limit_per_connection)
            .add_service(health)
            .add_service(reflection)
            .add_service(QuoteServer::new(self.quote))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                shutdown.cancelled().await;
                tracing::info!("gRPC server draining");
                reporter
                    .set_service_status(HEALTH_SERVICE_NAME, ServingStatus::NotServing)
                    .await;
            })
            .await?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}
