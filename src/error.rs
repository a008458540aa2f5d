//! Error types for the market data clients.
//!
//! Every client operation and reshaping helper returns [`Result`], so catalog
//! lookups, paginated timeseries queries and CoinGecko calls all surface a
//! failed response the same way.

use crate::coinmetrics::TimeFrame;

/// Maximum response body length kept in a [`Error::Status`].
pub const MAX_ERROR_BODY_LEN: usize = 500;

/// The main error type for the market data crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Remote service answered with a non-success status.
    #[error("{url}: status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// No CoinMetrics frequency code exists for this timeframe.
    #[error("unsupported frequency: {timeframe:?} x {multiplier}")]
    UnsupportedFrequency {
        timeframe: TimeFrame,
        multiplier: u32,
    },

    /// Market identifier did not split into exchange, base, quote and type.
    #[error("malformed market identifier {0:?}: expected exchange-base-quote-type")]
    MalformedMarket(String),

    /// A record lacks a column the reshaping step needs.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A column value could not be converted to a number.
    #[error("cannot convert {value} in column {column} to a number")]
    Coerce { column: String, value: String },

    /// A `time` value could not be parsed.
    #[error("cannot parse time value {value:?}")]
    InvalidTime { value: String },
}

/// A specialized Result type for market data operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a status error, truncating the body.
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Status {
            url: url.into(),
            status,
            body: body.chars().take(MAX_ERROR_BODY_LEN).collect(),
        }
    }

    /// Creates a coercion error for `column`.
    pub fn coerce(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Coerce {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// HTTP status of a [`Error::Status`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_carries_url_and_body() {
        let err = Error::status("https://example.com/v4/x", 403, "forbidden");
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "https://example.com/v4/x: status 403: forbidden");
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LEN * 2);
        match Error::status("u", 500, &body) {
            Error::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_LEN),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_display_malformed_market() {
        let err = Error::MalformedMarket("a-b-c".to_string());
        assert!(err.to_string().contains("\"a-b-c\""));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_display_coerce() {
        let err = Error::coerce("price_open", "abc");
        assert_eq!(err.to_string(), "cannot convert abc in column price_open to a number");
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
        assert!(err.to_string().contains("URL parsing error"));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serde(_)));
        assert!(err.to_string().contains("Serialization error"));
    }
}
