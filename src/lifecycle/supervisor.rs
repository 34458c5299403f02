//! Runs the HTTP and gRPC frontends as one unit.
//!
//! # Responsibilities
//! - Bind the gRPC listener, then the HTTP listener; fail before serving if either fails
//! - Serve both until shutdown is requested or either frontend exits
//! - When one frontend exits, stop the other and report the failure
//! - Bound the drain of in-flight requests by the configured timeout

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError};
use crate::rpc::RpcServer;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Bind(#[from] ListenerError),
    #[error("{frontend} frontend exited: {reason}")]
    FrontendFailed {
        frontend: &'static str,
        reason: String,
    },
}

/// Exit report from one frontend task.
type Exit = (&'static str, Result<(), String>);

/// Both frontends, built but not yet bound.
pub struct Supervisor {
    http: HttpServer,
    rpc: RpcServer,
    http_address: String,
    rpc_address: String,
    reuse_port: bool,
    drain_timeout: Duration,
}

impl Supervisor {
    pub fn new(
        http: HttpServer,
        rpc: RpcServer,
        http_address: impl Into<String>,
        rpc_address: impl Into<String>,
        reuse_port: bool,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            http,
            rpc,
            http_address: http_address.into(),
            rpc_address: rpc_address.into(),
            reuse_port,
            drain_timeout,
        }
    }

    /// Bind both listeners, gRPC first.
    pub fn bind(self) -> Result<Listening, SupervisorError> {
        let rpc_listener = net::bind("grpc", &self.rpc_address, self.reuse_port)?;
        let http_listener = net::bind("http", &self.http_address, self.reuse_port)?;

        let rpc_addr = net::local_addr("grpc", &rpc_listener)?;
        let http_addr = net::local_addr("http", &http_listener)?;

        Ok(Listening {
            http: self.http,
            rpc: self.rpc,
            http_listener,
            rpc_listener,
            http_addr,
            rpc_addr,
            drain_timeout: self.drain_timeout,
        })
    }
}

/// Both frontends with their listeners bound.
pub struct Listening {
    http: HttpServer,
    rpc: RpcServer,
    http_listener: TcpListener,
    rpc_listener: TcpListener,
    http_addr: SocketAddr,
    rpc_addr: SocketAddr,
    drain_timeout: Duration,
}

impl Listening {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn rpc_addr(&self) -> SocketAddr {
        self.rpc_addr
    }

    /// Serve until `shutdown` fires or a frontend exits.
    ///
    /// Returns the first frontend failure, if any. A frontend that stops
    /// without being asked to counts as a failure.
    pub async fn serve(self, shutdown: &Shutdown) -> Result<(), SupervisorError> {
        let (tx, mut exits) = mpsc::channel::<Exit>(2);

        let rpc = {
            let tx = tx.clone();
            let signal = shutdown.token();
            let server = self.rpc;
            let listener = self.rpc_listener;
            tokio::spawn(async move {
                let result = server.run(listener, signal).await.map_err(|e| e.to_string());
                let _ = tx.send(("grpc", result)).await;
            })
        };

        let http = {
            let signal = shutdown.token();
            let server = self.http;
            let listener = self.http_listener;
            tokio::spawn(async move {
                let result = server.run(listener, signal).await.map_err(|e| e.to_string());
                let _ = tx.send(("http", result)).await;
            })
        };

        tracing::info!(
            http = %self.http_addr,
            grpc = %self.rpc_addr,
            "Listening for connections"
        );

        let mut failure = None;
        let remaining = tokio::select! {
            _ = shutdown.wait() => {
                tracing::info!("shutdown requested, draining frontends");
                2
            }
            exit = exits.recv() => {
                match exit {
                    Some((frontend, Ok(()))) if shutdown.is_triggered() => {
                        tracing::debug!(frontend, "frontend drained");
                    }
                    Some((frontend, result)) => {
                        let reason = match result {
                            Ok(()) => "stopped unexpectedly".to_string(),
                            Err(reason) => reason,
                        };
                        tracing::error!(frontend, reason = %reason, "frontend exited, stopping the other");
                        failure = Some(SupervisorError::FrontendFailed { frontend, reason });
                    }
                    None => {}
                }
                shutdown.trigger();
                1
            }
        };

        let drained = tokio::time::timeout(self.drain_timeout, async {
            for _ in 0..remaining {
                match exits.recv().await {
                    Some((frontend, Err(reason))) => {
                        tracing::warn!(frontend, reason = %reason, "frontend failed while draining");
                        if failure.is_none() {
                            failure = Some(SupervisorError::FrontendFailed { frontend, reason });
                        }
                    }
                    Some((frontend, Ok(()))) => tracing::debug!(frontend, "frontend drained"),
                    None => break,
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                drain_timeout_secs = self.drain_timeout.as_secs(),
                "drain timeout elapsed, aborting in-flight requests"
            );
            abort(rpc);
            abort(http);
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn abort(task: JoinHandle<()>) {
    if !task.is_finished() {
        task.abort();
    }
}
