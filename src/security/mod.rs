//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (HSTS, CSP, frame/sniff/referrer policy)
//! ```
//!
//! There is no authentication; the quote routes are public.

pub mod headers;
