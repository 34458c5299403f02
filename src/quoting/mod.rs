//! Quote retrieval.
//!
//! # Data Flow
//! ```text
//! frontend handler
//!     → context.rs (RequestContext: span, trace, cancellation, deadline)
//!     → service.rs (QuoteService::get_quote)
//!     → client.rs (UpstreamQuoteClient::fetch_quote, one GET, no retry)
//!     → types.rs (QuoteSearchResult, then QuotaSearchError)
//!     → outcome.rs (QuoteOutcome)
//! ```

pub mod client;
pub mod context;
pub mod outcome;
pub mod service;
pub mod types;

pub use client::{decode_envelope, UpstreamClientError, UpstreamQuoteClient};
pub use context::{Interrupted, RequestContext};
pub use outcome::{QuoteOutcome, NO_QUOTES};
pub use service::{Frontend, QuoteService};
pub use types::{Quote, QuoteSearchResult, QuotaSearchError};
