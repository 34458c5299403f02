//! The quote service shared by both frontends.

use tracing::Instrument;

use crate::observability::metrics;
use crate::observability::Tracer;
use crate::quoting::client::UpstreamQuoteClient;
use crate::quoting::context::RequestContext;
use crate::quoting::outcome::QuoteOutcome;

/// Which frontend a call arrived on. Used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Http,
    Grpc,
}

impl Frontend {
    pub fn as_str(self) -> &'static str {
        match self {
            Frontend::Http => "http",
            Frontend::Grpc => "grpc",
        }
    }
}

/// Business logic behind `GET /` and `quote.Quote/GetQuote`.
///
/// Stateless and cheap to clone; every clone shares the same HTTP pool.
#[derive(Debug, Clone)]
pub struct QuoteService {
    client: UpstreamQuoteClient,
    tracer: Tracer,
}

impl QuoteService {
    pub fn new(client: UpstreamQuoteClient, tracer: Tracer) -> Self {
        Self { client, tracer }
    }

    pub fn client(&self) -> &UpstreamQuoteClient {
        &self.client
    }

    /// Look up the quote of the day.
    pub async fn get_quote(&self, ctx: &RequestContext, frontend: Frontend) -> QuoteOutcome {
        let span = self.tracer.internal_span(ctx.span(), "get_quote");
        span.record("quote_source", self.client.url().as_str());

        let child = ctx.child(span.clone());
        let outcome = self.client.fetch_quote(&child).instrument(span.clone()).await;

        span.record("outcome", outcome.kind());
        metrics::record_quote(frontend.as_str(), outcome.kind());
        outcome
    }

    /// Look up the quote of the day as display text.
    pub async fn get_quote_text(&self, ctx: &RequestContext, frontend: Frontend) -> String {
        self.get_quote(ctx, frontend).await.into_text()
    }
}
