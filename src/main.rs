//! Quote-of-the-day server.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP client ──▶ http (Axum, :8080) ──┐
//!                                        ├──▶ QuoteService ──▶ UpstreamQuoteClient ──▶ quote provider
//!   gRPC client ──▶ rpc (tonic, :50051) ─┘
//!
//!   Cross-cutting: config, observability (tracing, metrics), security headers,
//!   lifecycle (startup, supervisor, graceful shutdown)
//! ```

use clap::Parser;

use quote_server::config::Cli;
use quote_server::lifecycle::{self, shutdown_signal, Shutdown};
use quote_server::observability::{Telemetry, TelemetrySettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    let telemetry = Telemetry::start(TelemetrySettings::from(&config.observability))?;

    tracing::info!(
        http = %config.http.bind_address,
        grpc = %config.grpc.bind_address,
        upstream = %config.upstream.url,
        "Configuration loaded"
    );

    let listening = lifecycle::start(&config, telemetry.tracer(), telemetry.metrics_handle())?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let signal = shutdown_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        trigger.trigger();
    });

    let result = listening.serve(&shutdown).await;

    telemetry.shutdown();
    tracing::info!("Shutdown complete");
    result.map_err(Into::into)
}
