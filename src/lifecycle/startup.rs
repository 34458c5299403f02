//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the upstream client and the shared quote service
//! - Build both frontends around it
//! - Bind listeners last, so traffic only arrives once everything is ready

use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::supervisor::{Listening, Supervisor, SupervisorError};
use crate::observability::Tracer;
use crate::quoting::{QuoteService, UpstreamClientError, UpstreamQuoteClient};
use crate::rpc::RpcServer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Upstream(#[from] UpstreamClientError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

/// Assemble both frontends from `config` without binding.
pub fn build(
    config: &ServerConfig,
    tracer: Tracer,
    metrics: Option<PrometheusHandle>,
) -> Result<Supervisor, StartupError> {
    let client = UpstreamQuoteClient::new(&config.upstream, tracer.clone())?;
    let service = QuoteService::new(client, tracer.clone());

    tracing::info!(
        upstream = %service.client().url(),
        failure_policy = ?config.failure_policy,
        response_format = ?config.http.response_format,
        "Quote service ready"
    );

    let http = HttpServer::new(config, service.clone(), tracer.clone(), metrics);
    let rpc = RpcServer::new(&config.grpc, service, tracer, config.failure_policy);

    Ok(Supervisor::new(
        http,
        rpc,
        config.http.bind_address.clone(),
        config.grpc.bind_address.clone(),
        config.lifecycle.reuse_port,
        Duration::from_secs(config.lifecycle.drain_timeout_secs),
    ))
}

/// Build and bind.
pub fn start(
    config: &ServerConfig,
    tracer: Tracer,
    metrics: Option<PrometheusHandle>,
) -> Result<Listening, StartupError> {
    Ok(build(config, tracer, metrics)?.bind()?)
}
