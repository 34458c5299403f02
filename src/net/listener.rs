//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind a frontend to its configured address
//! - Set SO_REUSEADDR, and SO_REUSEPORT on unix when enabled, so a new
//!   process can bind the same port while the old one drains
//! - Report which frontend failed to bind

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket};

const BACKLOG: u32 = 1024;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// The configured address did not parse.
    Address { frontend: &'static str, source: std::net::AddrParseError },
    /// Failed to bind to address.
    Bind { frontend: &'static str, addr: SocketAddr, source: std::io::Error },
    /// The bound socket could not report its address.
    LocalAddr { frontend: &'static str, source: std::io::Error },
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address { frontend, source } => {
                write!(f, "Invalid {} listen address: {}", frontend, source)
            }
            ListenerError::Bind { frontend, addr, source } => {
                write!(f, "Failed to bind {} listener on {}: {}", frontend, addr, source)
            }
            ListenerError::LocalAddr { frontend, source } => {
                write!(f, "Failed to read {} listener address: {}", frontend, source)
            }
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Address { source, .. } => Some(source),
            ListenerError::Bind { source, .. } => Some(source),
            ListenerError::LocalAddr { source, .. } => Some(source),
        }
    }
}

/// Bind `address` for `frontend` ("http" or "grpc").
pub fn bind(frontend: &'static str, address: &str, reuse_port: bool) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = address
        .parse()
        .map_err(|source| ListenerError::Address { frontend, source })?;

    let listener = bind_addr(addr, reuse_port)
        .map_err(|source| ListenerError::Bind { frontend, addr, source })?;

    tracing::info!(
        frontend,
        address = %listener.local_addr().unwrap_or(addr),
        reuse_port,
        "Listener bound"
    );

    Ok(listener)
}

/// Address the listener actually bound (resolves port 0).
pub fn local_addr(frontend: &'static str, listener: &TcpListener) -> Result<SocketAddr, ListenerError> {
    listener
        .local_addr()
        .map_err(|source| ListenerError::LocalAddr { frontend, source })
}

fn bind_addr(addr: SocketAddr, reuse_port: bool) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    socket.set_reuseaddr(true)?;
    #[cfg(unix)]
    if reuse_port {
        socket.set_reuseport(true)?;
    }
    #[cfg(not(unix))]
    let _ = reuse_port;

    socket.bind(addr)?;
    socket.listen(BACKLOG)
}
