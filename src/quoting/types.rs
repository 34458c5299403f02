//! Upstream response envelopes.
//!
//! The provider answers with exactly one of two shapes: a search result
//! carrying `contents.quotes`, or an error object carrying `error.message`.
//! Unknown fields are ignored; quote metadata is carried through untouched.

use serde::{Deserialize, Serialize};

/// Success envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSearchResult {
    #[serde(default, rename = "success")]
    pub status: Option<Total>,
    #[serde(default)]
    pub contents: Option<QuoteList>,
    #[serde(default, rename = "baseurl")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub copyright: Option<Copyright>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Total {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(default)]
    pub year: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One quote record. Only `quote` is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, deserialize_with = "null_as_default")]
    pub quote: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// Error envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaSearchError {
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_success_envelope() {
        let body = r#"{
            "success": {"total": 1},
            "contents": {"quotes": [{
                "quote": "Be water.",
                "author": "Bruce Lee",
                "length": "9",
                "tags": ["water", "zen"],
                "category": "inspire",
                "language": "en",
                "title": "Inspiring Quote of the day",
                "date": "2021-05-01",
                "id": "abc123",
                "background": null,
                "permalink": "https://theysaidso.com/quote/abc123"
            }]},
            "baseurl": "https://theysaidso.com",
            "copyright": {"year": 2023, "url": "https://theysaidso.com"}
        }"#;

        let result: QuoteSearchResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.status.map(|s| s.total), Some(1));
        assert_eq!(result.copyright.and_then(|c| c.year), Some(2023.0));

        let quote = &result.contents.unwrap().quotes[0];
        assert_eq!(quote.quote, "Be water.");
        assert_eq!(quote.author.as_deref(), Some("Bruce Lee"));
        assert_eq!(quote.tags, vec!["water", "zen"]);
        assert_eq!(quote.background, None);
    }

    #[test]
    fn test_error_body_parses_as_result_without_contents() {
        let body = r#"{"error":{"code":429,"message":"Too Many Requests"}}"#;

        let result: QuoteSearchResult = serde_json::from_str(body).unwrap();
        assert!(result.contents.is_none());

        let error: QuotaSearchError = serde_json::from_str(body).unwrap();
        let error = error.error.unwrap();
        assert_eq!(error.code, 429.0);
        assert_eq!(error.message, "Too Many Requests");
    }

    #[test]
    fn test_null_fields_tolerated() {
        let body = r#"{"quote": null, "tags": null}"#;
        let quote: Quote = serde_json::from_str(body).unwrap();
        assert_eq!(quote.quote, "");
        assert!(quote.tags.is_empty());
    }
}
