//! Upstream quote provider client.
//!
//! # Responsibilities
//! - Issue a single GET to the provider, bound to the request context
//! - Decode the body as a search result, falling back to the error envelope
//! - Fold every failure into a [`QuoteOutcome`]; nothing is returned as `Err`
//! - Record method, URL, status and errors on a client span
//!
//! No retries and no client-side timeout: the request context is the only
//! bound on how long a call may take.

use std::time::Instant;

use axum::http::HeaderMap;
use reqwest::{Client, Method, Url};
use tracing::{Instrument, Span};

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::observability::tracing::{record_error, Tracer};
use crate::quoting::context::RequestContext;
use crate::quoting::outcome::QuoteOutcome;
use crate::quoting::types::{QuotaSearchError, QuoteSearchResult};

/// Client for the quote-of-the-day endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamQuoteClient {
    http: Client,
    url: Url,
    tracer: Tracer,
}

impl UpstreamQuoteClient {
    /// Build a client for `config.url`.
    pub fn new(config: &UpstreamConfig, tracer: Tracer) -> Result<Self, UpstreamClientError> {
        let url = Url::parse(&config.url)?;
        let http = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self { http, url, tracer })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the quote of the day.
    pub async fn fetch_quote(&self, ctx: &RequestContext) -> QuoteOutcome {
        let span = self.tracer.client_span(
            ctx.span(),
            "theysaidso_quote",
            Method::GET.as_str(),
            self.url.as_str(),
        );
        let start = Instant::now();

        let outcome = self.fetch(ctx, &span).instrument(span.clone()).await;

        metrics::record_upstream(outcome.kind(), start);
        outcome
    }

    async fn fetch(&self, ctx: &RequestContext, span: &Span) -> QuoteOutcome {
        let mut headers = HeaderMap::new();
        self.tracer.inject(&ctx.trace().child(), &mut headers);

        let request = match self.http.get(self.url.clone()).headers(headers).build() {
            Ok(request) => request,
            Err(e) => {
                record_error(span, &e);
                return QuoteOutcome::UpstreamUnavailable(String::new());
            }
        };

        tracing::info!("request sent");
        let response = match ctx.run(self.http.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                record_error(span, &e);
                return QuoteOutcome::UpstreamUnavailable(e.to_string());
            }
            Err(interrupted) => {
                record_error(span, &interrupted);
                return QuoteOutcome::UpstreamUnavailable(interrupted.to_string());
            }
        };

        let status = response.status();
        span.record("http.status_code", status.as_u16());
        tracing::info!(status = status.as_u16(), "response received");

        let body = match ctx.run(response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                record_error(span, &e);
                return QuoteOutcome::UpstreamUnavailable(e.to_string());
            }
            Err(interrupted) => {
                record_error(span, &interrupted);
                return QuoteOutcome::UpstreamUnavailable(interrupted.to_string());
            }
        };

        let outcome = decode_envelope(&body);
        if !outcome.is_quote() {
            record_error(span, &outcome);
        }
        outcome
    }
}

/// Errors building an [`UpstreamQuoteClient`].
#[derive(Debug, thiserror::Error)]
pub enum UpstreamClientError {
    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Decode a provider body.
///
/// The search result is tried first. Only if that fails, or yields no
/// `contents`, is the error envelope attempted.
pub fn decode_envelope(body: &[u8]) -> QuoteOutcome {
    let first_error = match serde_json::from_slice::<QuoteSearchResult>(body) {
        Ok(QuoteSearchResult {
            contents: Some(list),
            ..
        }) => {
            return match list.quotes.into_iter().next() {
                Some(quote) => QuoteOutcome::Quote(quote.quote),
                None => QuoteOutcome::EmptyResult,
            };
        }
        Ok(_) => None,
        Err(e) => Some(e),
    };

    match serde_json::from_slice::<QuotaSearchError>(body) {
        Ok(QuotaSearchError { error: Some(error) }) => QuoteOutcome::UpstreamError {
            code: error.code,
            message: error.message,
        },
        Ok(_) => match first_error {
            Some(e) => QuoteOutcome::decode_failed(e),
            None => QuoteOutcome::decode_failed("response contained neither contents nor error"),
        },
        Err(e) => QuoteOutcome::decode_failed(first_error.unwrap_or(e)),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tracing_test::traced_test;

    use super::*;
    use crate::observability::Propagator;
    use crate::quoting::outcome::DECODE_FAILED_PREFIX;

    fn tracer() -> Tracer {
        Tracer::new("quote", "test", &[Propagator::TraceContext])
    }

    fn client_for(url: String) -> UpstreamQuoteClient {
        let config = UpstreamConfig {
            url,
            ..UpstreamConfig::default()
        };
        UpstreamQuoteClient::new(&config, tracer()).unwrap()
    }

    /// Serve `body` once per connection and hand back the raw request head.
    async fn serve_body(body: &'static str) -> (SocketAddr, tokio::sync::mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::mpsc::channel(8);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string()).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (addr, rx)
    }

    #[test]
    fn test_decode_first_quote() {
        let body = br#"{"success":{"total":2},"contents":{"quotes":[
            {"quote":"Be water.","author":"Bruce Lee"},
            {"quote":"Second.","author":"Someone"}
        ]}}"#;
        assert_eq!(decode_envelope(body), QuoteOutcome::Quote("Be water.".into()));
    }

    #[test]
    fn test_decode_ignores_other_fields() {
        let body = br#"{"contents":{"quotes":[{"quote":"  spaced  ","tags":["a"],"extra":42}]},"baseurl":"x","unknown":{}}"#;
        assert_eq!(decode_envelope(body).text(), "  spaced  ");
    }

    #[test]
    fn test_decode_empty_quotes() {
        let body = br#"{"success":{"total":0},"contents":{"quotes":[]}}"#;
        let outcome = decode_envelope(body);
        assert_eq!(outcome, QuoteOutcome::EmptyResult);
        assert_eq!(outcome.text(), "did not receive any quotes from server");
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = br#"{"error":{"code":429,"message":"Too Many Requests"}}"#;
        assert_eq!(
            decode_envelope(body),
            QuoteOutcome::UpstreamError {
                code: 429.0,
                message: "Too Many Requests".into()
            }
        );
    }

    #[test]
    fn test_decode_null_quotes_is_empty_result() {
        let body = br#"{"success":{"total":0},"contents":{"quotes":null}}"#;
        assert_eq!(decode_envelope(body), QuoteOutcome::EmptyResult);
    }

    #[test]
    fn test_decode_null_total_keeps_quote() {
        let body = br#"{"success":{"total":null},"contents":{"quotes":[{"quote":"Be water."}]}}"#;
        assert_eq!(decode_envelope(body), QuoteOutcome::Quote("Be water.".into()));
    }

    #[test]
    fn test_decode_null_error_code_keeps_message() {
        let body = br#"{"error":{"code":null,"message":"Too Many Requests"}}"#;
        assert_eq!(
            decode_envelope(body),
            QuoteOutcome::UpstreamError {
                code: 0.0,
                message: "Too Many Requests".into()
            }
        );
    }

    #[test]
    fn test_decode_error_envelope_after_result_type_mismatch() {
        // `contents` of the wrong type fails the first decode; the error
        // envelope still matches.
        let body = br#"{"contents":"nope","error":{"code":401,"message":"Unauthorized"}}"#;
        assert_eq!(decode_envelope(body).text(), "Unauthorized");
    }

    #[test]
    fn test_decode_neither_shape() {
        for body in [&b"not json"[..], b"", br#"{"unrelated":true}"#, b"[1,2,3]"] {
            let outcome = decode_envelope(body);
            assert!(matches!(outcome, QuoteOutcome::DecodeFailed(_)), "{:?}", outcome);
            assert!(outcome.text().starts_with(DECODE_FAILED_PREFIX));
            assert!(outcome.text().len() > DECODE_FAILED_PREFIX.len());
        }
    }

    #[test]
    fn test_decode_failure_embeds_original_error() {
        let outcome = decode_envelope(b"not json");
        assert!(outcome.text().contains("expected"), "{}", outcome.text());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fetch_quote_over_http() {
        let (addr, mut requests) =
            serve_body(r#"{"contents":{"quotes":[{"quote":"Be water."}]}}"#).await;
        let client = client_for(format!("http://{}/qod.json", addr));

        let outcome = client.fetch_quote(&RequestContext::background()).await;
        assert_eq!(outcome, QuoteOutcome::Quote("Be water.".into()));

        let head = requests.recv().await.unwrap();
        assert!(head.starts_with("GET /qod.json HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("traceparent: 00-"));

        assert!(logs_contain("request sent"));
        assert!(logs_contain("response received"));
    }

    #[tokio::test]
    async fn test_fetch_quote_propagates_inbound_trace() {
        let (addr, mut requests) = serve_body(r#"{"contents":{"quotes":[]}}"#).await;
        let client = client_for(format!("http://{}/qod.json", addr));

        let trace = crate::observability::TraceContext::parse_traceparent(
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        )
        .unwrap();
        let ctx = RequestContext::new(Span::none(), trace);

        assert_eq!(client.fetch_quote(&ctx).await, QuoteOutcome::EmptyResult);

        let head = requests.recv().await.unwrap();
        assert!(head.contains("4bf92f3577b34da6a3ce929d0e0e4736"));
        // outbound hop gets its own span id
        assert!(!head.contains("00f067aa0ba902b7"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_connection_refused_is_text() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/qod.json", addr));
        let outcome = client.fetch_quote(&RequestContext::background()).await;

        assert!(matches!(outcome, QuoteOutcome::UpstreamUnavailable(_)));
        assert!(!outcome.text().is_empty());
        assert!(logs_contain("operation failed"));
    }

    #[tokio::test]
    async fn test_cancelled_context_returns_promptly() {
        // An address that accepts nothing keeps a plain call hanging.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = client_for(format!("http://{}/qod.json", addr));

        let ctx = RequestContext::background();
        ctx.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(2), client.fetch_quote(&ctx))
            .await
            .expect("cancelled fetch must not wait on the upstream");

        assert!(matches!(outcome, QuoteOutcome::UpstreamUnavailable(_)));
        assert!(outcome.text().contains("cancelled"));
        drop(listener);
    }

    #[tokio::test]
    async fn test_deadline_bounds_slow_upstream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept but never answer.
        let _hold = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let client = client_for(format!("http://{}/qod.json", addr));
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(200));

        let outcome = client.fetch_quote(&ctx).await;
        assert!(outcome.text().contains("deadline exceeded"), "{}", outcome.text());
    }
}
