//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use quote_server::config::ServerConfig;
use quote_server::lifecycle::{self, Shutdown, SupervisorError};
use quote_server::observability::{Propagator, Tracer};

pub const BE_WATER: &str =
    r#"{"success":{"total":1},"contents":{"quotes":[{"quote":"Be water.","author":"Bruce Lee"}]}}"#;

pub const TOO_MANY_REQUESTS: &str = r#"{"error":{"code":429,"message":"Too Many Requests"}}"#;

/// Start a mock upstream that always returns `body` with status 200.
pub async fn start_mock_upstream(body: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    start_programmable_upstream(move || async move { (200, body.to_string()) }).await
}

/// Start a programmable mock upstream.
///
/// Every raw request head is forwarded on the returned channel.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<String>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let _ = tx.send(head);

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    429 => "429 Too Many Requests",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).to_string()
}

/// An address with nothing listening on it.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running server on ephemeral ports.
pub struct TestServer {
    pub http: SocketAddr,
    pub rpc: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), SupervisorError>>,
}

impl TestServer {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.http, path)
    }

    pub fn rpc_url(&self) -> String {
        format!("http://{}", self.rpc)
    }

    /// Trigger shutdown and wait for the supervisor to return.
    pub async fn stop(self) -> Result<(), SupervisorError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(15), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("supervisor task panicked")
    }
}

/// Config with both frontends on ephemeral loopback ports.
pub fn test_config(upstream: SocketAddr) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.http.bind_address = "127.0.0.1:0".into();
    config.grpc.bind_address = "127.0.0.1:0".into();
    config.upstream.url = format!("http://{}/qod.json", upstream);
    config.lifecycle.reuse_port = false;
    config.lifecycle.drain_timeout_secs = 5;
    config
}

/// Build, bind and serve both frontends for `config`.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let tracer = Tracer::new(
        "quote",
        "test",
        &[Propagator::B3, Propagator::Baggage, Propagator::TraceContext],
    );
    let listening = lifecycle::start(&config, tracer, None).unwrap();
    let http = listening.http_addr();
    let rpc = listening.rpc_addr();

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move { listening.serve(&signal).await });

    TestServer { http, rpc, shutdown, handle }
}
