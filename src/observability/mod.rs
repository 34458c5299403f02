//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (spans carrying the inbound trace id)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → /metrics (Prometheus scrape)
//!     → upstream request headers (traceparent / b3 / baggage)
//! ```
//!
//! [`Telemetry`] is the process-wide provider: started once in `main`,
//! shut down on exit.

pub mod logging;
pub mod metrics;
pub mod tracing;

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

pub use self::tracing::{Propagator, TraceContext, Tracer};
use crate::config::LogFormat;

/// Errors raised while starting telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to install metrics recorder: {0}")]
    Recorder(#[from] metrics_exporter_prometheus::BuildError),
}

/// Settings for [`Telemetry::start`].
#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub propagators: Vec<Propagator>,
    pub metrics_enabled: bool,
}

impl From<&crate::config::ObservabilityConfig> for TelemetrySettings {
    fn from(config: &crate::config::ObservabilityConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
            log_level: config.log_level.clone(),
            log_format: config.log_format,
            propagators: config.propagators.clone(),
            metrics_enabled: config.metrics_enabled,
        }
    }
}

/// Handle to the process-wide logging, tracing and metrics setup.
pub struct Telemetry {
    tracer: Tracer,
    metrics: Option<PrometheusHandle>,
}

impl Telemetry {
    /// Install the subscriber and, if enabled, the metrics recorder.
    pub fn start(settings: TelemetrySettings) -> Result<Self, TelemetryError> {
        logging::init_logging(&settings.log_level, settings.log_format)?;

        let metrics = if settings.metrics_enabled {
            Some(metrics::init_metrics()?)
        } else {
            None
        };

        ::tracing::info!(
            service = %settings.service_name,
            version = %settings.service_version,
            propagators = ?settings.propagators,
            metrics_enabled = settings.metrics_enabled,
            "Telemetry started"
        );

        Ok(Self {
            tracer: Tracer::new(
                settings.service_name,
                settings.service_version,
                &settings.propagators,
            ),
            metrics,
        })
    }

    /// The tracer to hand to the quote service and its client.
    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }

    /// Scrape handle for `/metrics`, when metrics are enabled.
    pub fn metrics_handle(&self) -> Option<PrometheusHandle> {
        self.metrics.clone()
    }

    /// Flush pending metrics and log the shutdown.
    pub fn shutdown(self) {
        if let Some(handle) = &self.metrics {
            handle.run_upkeep();
        }
        ::tracing::info!(service = %self.tracer.service_name(), "Telemetry shut down");
    }
}
