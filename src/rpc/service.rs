//! `quote.Quote` service implementation.

use std::time::Duration;

use tonic::metadata::MetadataMap;
use tonic::{Code, Request, Response, Status};
use tracing::Span;

use crate::config::FailurePolicy;
use crate::observability::{metrics, Tracer};
use crate::quoting::{Frontend, QuoteOutcome, QuoteService, RequestContext};
use crate::rpc::proto::quote_server::Quote;
use crate::rpc::proto::{GetQuoteRequest, GetQuoteResponse};

const GRPC_TIMEOUT: &str = "grpc-timeout";

pub struct QuoteRpc {
    service: QuoteService,
    tracer: Tracer,
    policy: FailurePolicy,
    request_timeout: Duration,
}

impl QuoteRpc {
    pub fn new(
        service: QuoteService,
        tracer: Tracer,
        policy: FailurePolicy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            service,
            tracer,
            policy,
            request_timeout,
        }
    }

    /// The configured call timeout, or the client's `grpc-timeout` if shorter.
    fn call_timeout(&self, metadata: &MetadataMap) -> Duration {
        match client_timeout(metadata) {
            Some(timeout) => timeout.min(self.request_timeout),
            None => self.request_timeout,
        }
    }
}

#[tonic::async_trait]
impl Quote for QuoteRpc {
    async fn get_quote(
        &self,
        request: Request<GetQuoteRequest>,
    ) -> Result<Response<GetQuoteResponse>, Status> {
        let headers = request.metadata().clone().into_headers();
        let trace = self.tracer.extract(&headers);
        let span = Span::current();
        self.tracer.record_trace(&span, &trace);

        let ctx = RequestContext::new(span, trace).with_timeout(self.call_timeout(request.metadata()));
        let outcome = self.service.get_quote(&ctx, Frontend::Grpc).await;

        let result = respond(outcome, self.policy);
        let code = match &result {
            Ok(_) => Code::Ok,
            Err(status) => status.code(),
        };
        metrics::record_grpc_request("GetQuote", code);
        result
    }
}

/// Parse the `grpc-timeout` header: up to eight digits and a unit.
fn client_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let value = metadata.get(GRPC_TIMEOUT)?.to_str().ok()?;
    if value.len() < 2 || value.len() > 9 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let timeout = match unit {
        "H" => Duration::from_secs(amount.checked_mul(3600)?),
        "M" => Duration::from_secs(amount.checked_mul(60)?),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(timeout)
}

/// Map an outcome to the RPC result under `policy`.
pub fn respond(
    outcome: QuoteOutcome,
    policy: FailurePolicy,
) -> Result<Response<GetQuoteResponse>, Status> {
    if policy == FailurePolicy::Strict {
        match &outcome {
            QuoteOutcome::Quote(_) => {}
            QuoteOutcome::UpstreamUnavailable(_) | QuoteOutcome::UpstreamError { .. } => {
                return Err(Status::unavailable(outcome.into_text()));
            }
            QuoteOutcome::DecodeFailed(_) => return Err(Status::internal(outcome.into_text())),
            QuoteOutcome::EmptyResult => return Err(Status::not_found(outcome.into_text())),
        }
    }

    Ok(Response::new(GetQuoteResponse {
        quote_text: outcome.into_text(),
    }))
}
