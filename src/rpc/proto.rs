//! Wire types for the `quote.Quote` service.
//!
//! ```text
//! syntax = "proto3";
//! package quote;
//!
//! service Quote {
//!     rpc GetQuote(GetQuoteRequest) returns (GetQuoteResponse);
//! }
//!
//! message GetQuoteRequest {}
//! message GetQuoteResponse { string quote_text = 1; }
//! ```

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetQuoteRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetQuoteResponse {
    #[prost(string, tag = "1")]
    pub quote_text: ::prost::alloc::string::String,
}

include!(concat!(env!("OUT_DIR"), "/quote.Quote.rs"));
