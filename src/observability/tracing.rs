//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests (HTTP headers, gRPC metadata)
//! - Propagate trace context to the upstream request
//! - Create spans for server and client operations
//!
//! Supported formats are W3C Trace Context (`traceparent`), B3 (single
//! `b3` header or the `X-B3-*` family) and W3C `baggage`.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::field::Empty;
use tracing::Span;

const TRACEPARENT: &str = "traceparent";
const B3: &str = "b3";
const B3_TRACE_ID: &str = "x-b3-traceid";
const B3_SPAN_ID: &str = "x-b3-spanid";
const B3_SAMPLED: &str = "x-b3-sampled";
const BAGGAGE: &str = "baggage";

/// A trace context wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagator {
    /// W3C `traceparent`.
    TraceContext,
    /// Zipkin B3.
    B3,
    /// W3C `baggage`, carried verbatim.
    Baggage,
}

/// Identifiers of the current position in a distributed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// 32 lowercase hex characters.
    pub trace_id: String,
    /// 16 lowercase hex characters.
    pub span_id: String,
    pub sampled: bool,
    pub baggage: Option<String>,
}

impl TraceContext {
    /// Start a new trace.
    pub fn root() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().simple().to_string(),
            span_id: new_span_id(),
            sampled: true,
            baggage: None,
        }
    }

    /// Same trace, new span id. Used for the outbound hop.
    pub fn child(&self) -> Self {
        Self {
            span_id: new_span_id(),
            ..self.clone()
        }
    }

    /// Render as a W3C `traceparent` value.
    pub fn to_traceparent(&self) -> String {
        format!(
            "00-{}-{}-{}",
            self.trace_id,
            self.span_id,
            if self.sampled { "01" } else { "00" }
        )
    }

    /// Render as a single-header B3 value.
    pub fn to_b3(&self) -> String {
        format!(
            "{}-{}-{}",
            self.trace_id,
            self.span_id,
            if self.sampled { "1" } else { "0" }
        )
    }

    /// Parse a W3C `traceparent` value (version 00 layout).
    pub fn parse_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if version.len() != 2 || version == "ff" || !is_hex(version) {
            return None;
        }
        if version == "00" && parts.next().is_some() {
            return None;
        }
        if !is_valid_id(trace_id, 32) || !is_valid_id(span_id, 16) {
            return None;
        }
        if flags.len() != 2 || !is_hex(flags) {
            return None;
        }

        let flags = u8::from_str_radix(flags, 16).ok()?;
        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
            sampled: flags & 0x01 == 0x01,
            baggage: None,
        })
    }

    /// Parse a single-header B3 value: `{trace}-{span}[-{sampled}[-{parent}]]`.
    pub fn parse_b3(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let sampled = parts.next().map_or(true, |s| s == "1" || s == "d");
        Self::from_b3_parts(trace_id, span_id, sampled)
    }

    fn from_b3_parts(trace_id: &str, span_id: &str, sampled: bool) -> Option<Self> {
        // 64-bit B3 trace ids are left-padded to 128 bits.
        let trace_id = match trace_id.len() {
            16 => format!("{:0>32}", trace_id),
            _ => trace_id.to_string(),
        };
        if !is_valid_id(&trace_id, 32) || !is_valid_id(span_id, 16) {
            return None;
        }
        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
            sampled,
            baggage: None,
        })
    }
}

fn new_span_id() -> String {
    format!("{:016x}", fastrand::u64(1..))
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_valid_id(s: &str, len: usize) -> bool {
    s.len() == len && is_hex(s) && s.bytes().any(|b| b != b'0')
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Span factory and propagation handle.
///
/// Held by the quote service and the upstream client instead of a global
/// tracer, so the service name and formats are fixed at construction.
#[derive(Debug, Clone)]
pub struct Tracer {
    service_name: Arc<str>,
    service_version: Arc<str>,
    propagators: Arc<[Propagator]>,
}

impl Tracer {
    pub fn new(
        service_name: impl Into<Arc<str>>,
        service_version: impl Into<Arc<str>>,
        propagators: &[Propagator],
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            propagators: propagators.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Read the inbound trace context, starting a new trace if none is present.
    pub fn extract(&self, headers: &HeaderMap) -> TraceContext {
        let mut found = None;
        let mut baggage = None;

        for propagator in self.propagators.iter() {
            match propagator {
                Propagator::TraceContext if found.is_none() => {
                    found = header_str(headers, TRACEPARENT).and_then(TraceContext::parse_traceparent);
                }
                Propagator::B3 if found.is_none() => {
                    found = header_str(headers, B3)
                        .and_then(TraceContext::parse_b3)
                        .or_else(|| {
                            let trace_id = header_str(headers, B3_TRACE_ID)?;
                            let span_id = header_str(headers, B3_SPAN_ID)?;
                            let sampled = header_str(headers, B3_SAMPLED).map_or(true, |s| s == "1");
                            TraceContext::from_b3_parts(trace_id, span_id, sampled)
                        });
                }
                Propagator::Baggage => {
                    baggage = header_str(headers, BAGGAGE).map(str::to_string);
                }
                _ => {}
            }
        }

        let mut context = found.unwrap_or_else(TraceContext::root);
        context.baggage = baggage;
        context
    }

    /// Write `context` into outbound headers using every configured format.
    pub fn inject(&self, context: &TraceContext, headers: &mut HeaderMap) {
        for propagator in self.propagators.iter() {
            let (name, value) = match propagator {
                Propagator::TraceContext => (TRACEPARENT, context.to_traceparent()),
                Propagator::B3 => (B3, context.to_b3()),
                Propagator::Baggage => match &context.baggage {
                    Some(baggage) => (BAGGAGE, baggage.clone()),
                    None => continue,
                },
            };
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(name, value);
            }
        }
    }

    /// Span for an inbound request on one of the frontends.
    pub fn server_span(&self, protocol: &'static str, operation: &str) -> Span {
        tracing::info_span!(
            "request",
            service = %self.service_name,
            service.version = %self.service_version,
            otel.kind = "server",
            protocol,
            operation,
            trace_id = Empty,
        )
    }

    /// Span for one logical operation inside the service.
    pub fn internal_span(&self, parent: &Span, name: &'static str) -> Span {
        tracing::info_span!(
            parent: parent,
            "operation",
            service = %self.service_name,
            otel.name = name,
            otel.kind = "internal",
            quote_source = Empty,
            outcome = Empty,
        )
    }

    /// Span for an outbound HTTP call.
    pub fn client_span(&self, parent: &Span, name: &'static str, method: &str, url: &str) -> Span {
        tracing::info_span!(
            parent: parent,
            "upstream",
            service = %self.service_name,
            otel.name = name,
            otel.kind = "client",
            http.method = %method,
            http.url = %url,
            http.status_code = Empty,
            quote_source = %url,
            error = Empty,
        )
    }

    /// Attach the trace id to a frontend span.
    pub fn record_trace(&self, span: &Span, context: &TraceContext) {
        span.record("trace_id", context.trace_id.as_str());
    }
}

/// Mark `span` failed and emit an error event on it.
pub fn record_error(span: &Span, error: &dyn std::fmt::Display) {
    span.record("error", true);
    tracing::warn!(parent: span, error = %error, "operation failed");
}
