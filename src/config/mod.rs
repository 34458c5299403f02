//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (flag / environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! Config is read once at startup; there is no reload.

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{read_config, ConfigError};
pub use schema::{
    FailurePolicy, GrpcConfig, HttpConfig, LifecycleConfig, LogFormat, ObservabilityConfig,
    ResponseFormat, SecurityConfig, ServerConfig, UpstreamConfig,
};
