//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate listen addresses and the upstream URL
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! Validation returns every problem found, not just the first.

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration, collecting all errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let http_addr = parse_addr("http.bind_address", &config.http.bind_address, &mut errors);
    let grpc_addr = parse_addr("grpc.bind_address", &config.grpc.bind_address, &mut errors);

    if let (Some(http), Some(grpc)) = (http_addr, grpc_addr) {
        if http.port() != 0 && http == grpc {
            errors.push(ValidationError::new(
                "grpc.bind_address",
                format!("must differ from http.bind_address ({})", http),
            ));
        }
    }

    match url::Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be > 0"));
    }

    if config.grpc.request_timeout_secs == 0 {
        errors.push(ValidationError::new("grpc.request_timeout_secs", "must be > 0"));
    }

    if config.grpc.concurrency_limit_per_connection == 0 {
        errors.push(ValidationError::new(
            "grpc.concurrency_limit_per_connection",
            "must be > 0",
        ));
    }

    if config.lifecycle.drain_timeout_secs == 0 {
        errors.push(ValidationError::new("lifecycle.drain_timeout_secs", "must be > 0"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }

    if config.observability.service_name.trim().is_empty() {
        errors.push(ValidationError::new("observability.service_name", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_addr(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(e) => {
            errors.push(ValidationError::new(field, format!("'{}': {}", value, e)));
            None
        }
    }
}
