//! Response rendering for the quote routes.
//!
//! # Responsibilities
//! - Render a quote as the HTML page or the JSON body
//! - Pick the status code for an outcome under the configured failure policy
//!
//! Under [`FailurePolicy::Degrade`] every outcome is a 200 whose body is the
//! display text, including upstream errors and decode diagnostics.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;

use crate::config::{FailurePolicy, ResponseFormat};
use crate::quoting::QuoteOutcome;

const HEADER: &str = "<html><body>";
const FOOTER: &str = "</body></html>";

/// Static credit for the quote provider.
const ATTRIBUTION: &str = r#"
<span style="z-index:50;font-size:0.9em;font-weight:bold;">
    <img src="https://theysaidso.com/branding/theysaidso.png" height="20" width="20" alt="theysaidso.com"/>
    <a href="https://theysaidso.com" title="Powered by quotes from theysaidso.com" style="color:#ccc;margin-left:4px;vertical-align:middle;">They Said So&reg;</a>
</span>
"#;

/// JSON body of the quote routes.
#[derive(Debug, Serialize)]
pub struct QuoteBody<'a> {
    pub quote: &'a str,
}

/// Status code for `outcome` under `policy`.
pub fn status_for(outcome: &QuoteOutcome, policy: FailurePolicy) -> StatusCode {
    match policy {
        FailurePolicy::Degrade => StatusCode::OK,
        FailurePolicy::Strict => match outcome {
            QuoteOutcome::Quote(_) => StatusCode::OK,
            QuoteOutcome::UpstreamUnavailable(_)
            | QuoteOutcome::UpstreamError { .. }
            | QuoteOutcome::DecodeFailed(_) => StatusCode::BAD_GATEWAY,
            QuoteOutcome::EmptyResult => StatusCode::NOT_FOUND,
        },
    }
}

/// Render `outcome` in `format`.
pub fn render(outcome: &QuoteOutcome, format: ResponseFormat, policy: FailurePolicy) -> Response {
    let status = status_for(outcome, policy);
    match format {
        ResponseFormat::Html => (status, Html(render_html(outcome.text()))).into_response(),
        ResponseFormat::Json => (status, Json(QuoteBody { quote: outcome.text() })).into_response(),
    }
}

/// The quote page: fixed shell, escaped quote, attribution.
pub fn render_html(text: &str) -> String {
    let mut page = String::with_capacity(HEADER.len() + text.len() + ATTRIBUTION.len() + 32);
    page.push_str(HEADER);
    page.push_str("<div>");
    push_escaped(&mut page, text);
    page.push_str("</div>");
    page.push_str(ATTRIBUTION);
    page.push_str(FOOTER);
    page
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_contains_quote_once() {
        let page = render_html("Be water.");
        assert!(page.starts_with("<html><body><div>Be water.</div>"));
        assert!(page.ends_with("</body></html>"));
        assert_eq!(page.matches("Be water.").count(), 1);
        assert!(page.contains("theysaidso.com"));
    }

    #[test]
    fn test_html_escapes_markup() {
        let page = render_html(r#"<script>alert("x")</script> & 'y'"#);
        assert!(page.contains(
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        ));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_degrade_is_always_ok() {
        for outcome in [
            QuoteOutcome::Quote("q".into()),
            QuoteOutcome::UpstreamUnavailable("refused".into()),
            QuoteOutcome::UpstreamError { code: 429.0, message: "Too Many Requests".into() },
            QuoteOutcome::DecodeFailed("bad".into()),
            QuoteOutcome::EmptyResult,
        ] {
            assert_eq!(status_for(&outcome, FailurePolicy::Degrade), StatusCode::OK);
        }
    }

    #[test]
    fn test_strict_maps_failures() {
        assert_eq!(
            status_for(&QuoteOutcome::UpstreamUnavailable("x".into()), FailurePolicy::Strict),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&QuoteOutcome::EmptyResult, FailurePolicy::Strict),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&QuoteOutcome::Quote("q".into()), FailurePolicy::Strict),
            StatusCode::OK
        );
    }
}
