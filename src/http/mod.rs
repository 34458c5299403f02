//! HTTP frontend.
//!
//! # Data Flow
//! ```text
//! TcpListener (net::bind)
//!     → server.rs (Axum router, layers, graceful shutdown)
//!     → request.rs (request id, request span, RequestContext)
//!     → handlers.rs (QuoteService::get_quote)
//!     → response.rs (HTML or JSON body, status per failure policy)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
