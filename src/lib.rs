//! Quote-of-the-day service.
//!
//! One quote service served over two frontends: HTTP (Axum) and gRPC (tonic).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod quoting;
pub mod rpc;
pub mod security;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use quoting::{QuoteOutcome, QuoteService};
pub use rpc::RpcServer;
