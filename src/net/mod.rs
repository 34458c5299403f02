//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig bind addresses
//!     → listener.rs (parse, socket options, bind)
//!     → TcpListener handed to the HTTP or gRPC frontend
//! ```

pub mod listener;

pub use listener::{bind, local_addr, ListenerError};
