//! Error types for the open-data broker.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters of an upstream body kept in an error detail.
const RAW_EXCERPT_CHARS: usize = 500;

/// Classification of a failed upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No service key was configured; no request was sent.
    MissingCredential,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection, TLS or other transport failure.
    TransportError,
    /// The response body was not the expected JSON envelope.
    ParseError,
    /// The upstream answered with an error status or result code.
    UpstreamError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingCredential => "missing_credential",
            Self::Timeout => "timeout",
            Self::TransportError => "transport_error",
            Self::ParseError => "parse_error",
            Self::UpstreamError => "upstream_error",
        };
        f.write_str(name)
    }
}

/// A failed fetch. Carries the raw upstream payload when one was received.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {detail}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub detail: String,
    pub raw_payload: Option<String>,
}

impl FetchError {
    /// Create an error without an attached payload.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            raw_payload: None,
        }
    }

    /// No service key configured.
    pub fn missing_credential() -> Self {
        Self::new(
            ErrorKind::MissingCredential,
            "service key not configured (set OPENAPI_KOREA_SERVICE_KEY or serviceKey in config.json)",
        )
    }

    /// The request timed out after `elapsed`.
    pub fn timeout(elapsed: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("request timed out after {:.1}s", elapsed.as_secs_f64()),
        )
    }

    /// Any other transport failure.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, msg)
    }

    /// The body could not be read as the expected envelope.
    ///
    /// The detail holds an excerpt of the body, the full body is attached.
    pub fn parse(raw_body: &str, reason: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::ParseError,
            detail: format!("{} ({})", excerpt(raw_body), reason),
            raw_payload: Some(raw_body.to_string()),
        }
    }

    /// The upstream reported an error.
    pub fn upstream(detail: impl Into<String>, raw_body: &str) -> Self {
        Self {
            kind: ErrorKind::UpstreamError,
            detail: detail.into(),
            raw_payload: Some(raw_body.to_string()),
        }
    }
}

/// A category identifier that is not one of the supported four.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= RAW_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(RAW_EXCERPT_CHARS).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_keeps_raw_body() {
        let err = FetchError::parse("<html>Service Unavailable</html>", "expected value");
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.detail.contains("<html>Service Unavailable</html>"));
        assert_eq!(
            err.raw_payload.as_deref(),
            Some("<html>Service Unavailable</html>")
        );
    }

    #[test]
    fn test_parse_error_excerpt_is_bounded() {
        let body = "가".repeat(2000);
        let err = FetchError::parse(&body, "bad");
        assert!(err.detail.chars().count() < 600);
        assert_eq!(err.raw_payload.unwrap().chars().count(), 2000);
    }

    #[test]
    fn test_display() {
        let err = FetchError::timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "timeout: request timed out after 10.0s");
        assert_eq!(
            serde_json::to_value(ErrorKind::MissingCredential).unwrap(),
            serde_json::json!("missing_credential")
        );
    }
}
