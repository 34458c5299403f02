//! Result of one quote lookup.

use std::fmt;

/// Display text when the provider returned a valid envelope with no quotes.
pub const NO_QUOTES: &str = "did not receive any quotes from server";

/// Prefix of the diagnostic returned when the body matches neither envelope.
pub const DECODE_FAILED_PREFIX: &str = "failed to decode response from server";

/// What the upstream client produced.
///
/// Every variant renders to a display string through [`QuoteOutcome::text`];
/// frontends decide per variant whether that text is a success body or an
/// error (see [`crate::config::FailurePolicy`]).
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// The first quote of the result set.
    Quote(String),
    /// The request could not be built, sent or read. Holds the error text.
    UpstreamUnavailable(String),
    /// The provider answered with its error envelope.
    UpstreamError { code: f64, message: String },
    /// The body matched neither envelope. Holds the full diagnostic.
    DecodeFailed(String),
    /// A valid result set with zero quotes.
    EmptyResult,
}

impl QuoteOutcome {
    pub(crate) fn decode_failed(detail: impl fmt::Display) -> Self {
        Self::DecodeFailed(format!("{}: {}", DECODE_FAILED_PREFIX, detail))
    }

    /// The display string served to clients.
    pub fn text(&self) -> &str {
        match self {
            Self::Quote(text) => text,
            Self::UpstreamUnavailable(detail) => detail,
            Self::UpstreamError { message, .. } => message,
            Self::DecodeFailed(detail) => detail,
            Self::EmptyResult => NO_QUOTES,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Quote(text) => text,
            Self::UpstreamUnavailable(detail) => detail,
            Self::UpstreamError { message, .. } => message,
            Self::DecodeFailed(detail) => detail,
            Self::EmptyResult => NO_QUOTES.to_string(),
        }
    }

    /// Metric / log label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quote(_) => "quote",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::UpstreamError { .. } => "upstream_error",
            Self::DecodeFailed(_) => "decode_failed",
            Self::EmptyResult => "empty_result",
        }
    }

    pub fn is_quote(&self) -> bool {
        matches!(self, Self::Quote(_))
    }
}

impl fmt::Display for QuoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
