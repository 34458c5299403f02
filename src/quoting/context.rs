//! Request-scoped context handed from a frontend to the quote service.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::observability::TraceContext;

/// Why a context-bound operation stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupted::Cancelled => write!(f, "request cancelled before the upstream call completed"),
            Interrupted::DeadlineExceeded => write!(f, "request deadline exceeded while calling upstream"),
        }
    }
}

impl std::error::Error for Interrupted {}

/// Cancellation, deadline and trace parent of one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    span: Span,
    trace: TraceContext,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(span: Span, trace: TraceContext) -> Self {
        Self {
            span,
            trace,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context parented on the current span, starting a fresh trace.
    pub fn background() -> Self {
        Self::new(Span::current(), TraceContext::root())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Same cancellation and deadline, parented on `span`.
    pub fn child(&self, span: Span) -> Self {
        Self {
            span,
            ..self.clone()
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` until it completes, the context is cancelled, or the
    /// deadline passes. Cancellation is checked first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}
