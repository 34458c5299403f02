//! Command-line flags for the server binary.
//!
//! Every flag also reads an environment variable; flags win over the config
//! file, the config file wins over built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{ResponseFormat, ServerConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "quote-server")]
#[command(about = "Serves the quote of the day over HTTP and gRPC", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long, env = "QUOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP listen port.
    #[arg(long, env = "QUOTE_HTTP_PORT")]
    pub http_port: Option<u16>,

    /// gRPC listen port.
    #[arg(long, env = "QUOTE_GRPC_PORT")]
    pub grpc_port: Option<u16>,

    /// Enable the Prometheus endpoint.
    #[arg(long, env = "QUOTE_ENABLE_METRICS")]
    pub enable_metrics: Option<bool>,

    /// Version of the binary, reported in logs and spans.
    #[arg(long = "version-string", env = "QUOTE_VERSION")]
    pub version: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "QUOTE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Body format for `/` (html or json).
    #[arg(long, env = "QUOTE_RESPONSE_FORMAT")]
    pub response_format: Option<ResponseFormat>,

    /// Upstream quote endpoint.
    #[arg(long, env = "QUOTE_UPSTREAM_URL")]
    pub upstream_url: Option<String>,
}

impl Cli {
    /// Load the config file (or defaults), apply overrides, then validate.
    pub fn load(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.http_port {
            config.http.bind_address = with_port(&config.http.bind_address, port);
        }
        if let Some(port) = self.grpc_port {
            config.grpc.bind_address = with_port(&config.grpc.bind_address, port);
        }
        if let Some(enabled) = self.enable_metrics {
            config.observability.metrics_enabled = enabled;
        }
        if let Some(version) = &self.version {
            config.observability.service_version = version.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.response_format {
            config.http.response_format = format;
        }
        if let Some(url) = &self.upstream_url {
            config.upstream.url = url.clone();
        }
    }
}

/// Replace the port of `address`, keeping its host. Unparseable addresses
/// fall back to listening on all interfaces.
fn with_port(address: &str, port: u16) -> String {
    match address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "quote-server",
            "--http-port",
            "9000",
            "--grpc-port",
            "9001",
            "--enable-metrics",
            "false",
            "--version-string",
            "v1.2.3",
            "--response-format",
            "json",
        ])
        .unwrap();

        let mut config = ServerConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.http.bind_address, "0.0.0.0:9000");
        assert_eq!(config.grpc.bind_address, "0.0.0.0:9001");
        assert!(!config.observability.metrics_enabled);
        assert_eq!(config.observability.service_version, "v1.2.3");
        assert_eq!(config.http.response_format, ResponseFormat::Json);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let cli = Cli::try_parse_from(["quote-server"]).unwrap();
        let mut config = ServerConfig::default();
        config.http.bind_address = "127.0.0.1:1234".into();
        cli.apply(&mut config);
        assert_eq!(config.http.bind_address, "127.0.0.1:1234");
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_flag_repairs_invalid_file_value() {
        let path = write_config("quote-cli-repair", "[upstream]\nurl = \"not a url\"\n");
        let config_arg = path.to_str().unwrap();

        let err = Cli::try_parse_from(["quote-server", "--config", config_arg])
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));

        let config = Cli::try_parse_from([
            "quote-server",
            "--config",
            config_arg,
            "--upstream-url",
            "https://quotes.example/qod.json",
        ])
        .unwrap()
        .load()
        .unwrap();
        assert_eq!(config.upstream.url, "https://quotes.example/qod.json");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_flag_introduced_error_is_reported() {
        let cli = Cli::try_parse_from(["quote-server", "--upstream-url", "ftp://quotes.example"]).unwrap();
        let err = cli.load().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("upstream.url"));
    }

    #[test]
    fn test_with_port_keeps_host() {
        assert_eq!(with_port("127.0.0.1:8080", 80), "127.0.0.1:80");
        assert_eq!(with_port("[::1]:8080", 80), "[::1]:80");
        assert_eq!(with_port("garbage", 80), "0.0.0.0:80");
    }
}
