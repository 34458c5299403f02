//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files, and
//! every section can be omitted.

use serde::{Deserialize, Serialize};

use crate::observability::tracing::Propagator;

/// Root configuration for the quote server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP frontend settings.
    pub http: HttpConfig,

    /// gRPC frontend settings.
    pub grpc: GrpcConfig,

    /// Upstream quote provider.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Response hardening.
    pub security: SecurityConfig,

    /// Listener and shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// How upstream failures are rendered by the frontends.
    pub failure_policy: FailurePolicy,
}

/// HTTP frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Body format served on `/`.
    pub response_format: ResponseFormat,

    /// Deadline for a single quote request, upstream call included.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            response_format: ResponseFormat::Html,
            request_timeout_secs: 30,
        }
    }
}

/// Body format for the quote route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// HTML page with attribution.
    #[default]
    Html,
    /// `{"quote": "..."}`.
    Json,
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown response format '{}'", other)),
        }
    }
}

/// gRPC frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GrpcConfig {
    /// Bind address (e.g., "0.0.0.0:50051").
    pub bind_address: String,

    /// Maximum concurrent calls on a single HTTP/2 connection.
    pub concurrency_limit_per_connection: usize,

    /// Upper bound on a call; a shorter client `grpc-timeout` wins.
    pub request_timeout_secs: u64,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50051".to_string(),
            concurrency_limit_per_connection: 32,
            request_timeout_secs: 30,
        }
    }
}

/// Upstream quote provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Quote-of-the-day endpoint.
    pub url: String,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://quotes.rest/qod.json".to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name used for spans and health registration.
    pub service_name: String,

    /// Version string reported at startup and on spans.
    pub service_version: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the `/metrics` endpoint.
    pub metrics_enabled: bool,

    /// Trace context formats read from inbound and written to outbound requests.
    pub propagators: Vec<Propagator>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "quote".to_string(),
            service_version: String::new(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            propagators: vec![Propagator::B3, Propagator::Baggage, Propagator::TraceContext],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Listener and shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long the surviving frontend may drain after the other one exits.
    pub drain_timeout_secs: u64,

    /// Bind listeners with SO_REUSEPORT so a replacement process can take over.
    pub reuse_port: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 10,
            reuse_port: true,
        }
    }
}

/// Rendering policy for upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Every outcome is a successful response whose body is the display text.
    #[default]
    Degrade,
    /// Failures map to HTTP 5xx/404 and gRPC error statuses.
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http.bind_address, "0.0.0.0:8080");
        assert_eq!(config.grpc.bind_address, "0.0.0.0:50051");
        assert_eq!(config.upstream.url, "http://quotes.rest/qod.json");
        assert_eq!(config.failure_policy, FailurePolicy::Degrade);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: ServerConfig = toml::from_str(
            r#"
            failure_policy = "strict"

            [http]
            response_format = "json"

            [observability]
            propagators = ["tracecontext"]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.response_format, ResponseFormat::Json);
        assert_eq!(config.http.request_timeout_secs, 30);
        assert_eq!(config.failure_policy, FailurePolicy::Strict);
        assert_eq!(config.observability.propagators, vec![Propagator::TraceContext]);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_response_format_from_str() {
        assert_eq!("HTML".parse::<ResponseFormat>(), Ok(ResponseFormat::Html));
        assert_eq!("json".parse::<ResponseFormat>(), Ok(ResponseFormat::Json));
        assert!("xml".parse::<ResponseFormat>().is_err());
    }
}
