//! Error types for the Monday.com GraphQL adapter.
//!
//! Errors are classified as retryable (transport, timeout, rate limit) or
//! permanent so callers can decide whether to re-run an operation.

use thiserror::Error;

use crate::ids::BoardId;

/// Result alias for Monday client operations.
pub type MondayClientResult<T> = Result<T, MondayClientError>;

/// Error returned by [`crate::client::MondayClient`] and other
/// [`crate::api::BoardApi`] implementations.
#[derive(Debug, Error)]
pub enum MondayClientError {
    /// The endpoint could not be reached (DNS, connect, reset).
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The API throttled the request (HTTP 429 or complexity budget exhausted).
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The token was rejected.
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// A non-success HTTP status that is not otherwise classified.
    #[error("HTTP {status}: {detail}")]
    ApiError { status: u16, detail: String },

    /// The request reached the GraphQL layer and was rejected there
    /// (invalid column id, malformed value, unknown board, ...).
    #[error("GraphQL error{}: {message}", code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default())]
    GraphQl {
        code: Option<String>,
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// An item query still had pages left after the configured page cap.
    /// The partial result is not returned, since callers treat lookups as
    /// complete.
    #[error("item query on board {board_id} still had results after {pages} pages")]
    ResultTruncated { board_id: BoardId, pages: u32 },

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MondayClientError {
    /// Whether the call may succeed if repeated: transport failures,
    /// timeouts, throttling and 5xx responses.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::Timeout { .. } | Self::RateLimited { .. }
        ) || self.is_server_error()
    }

    /// Whether this is a 5xx server-side failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Retry hint supplied by the server, if any.
    #[must_use]
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

impl MondayClientError {
    /// Classify a transport-level `reqwest` error.
    ///
    /// `timeout` is the per-request timeout the client was configured with;
    /// reqwest does not carry it on the error.
    pub(crate) fn from_transport(err: &reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if err.is_builder() {
            Self::InvalidConfig(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MondayClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(MondayClientError::Unreachable("host".into()).is_retryable());
        assert!(MondayClientError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(MondayClientError::RateLimited {
            retry_after_secs: Some(10)
        }
        .is_retryable());

        assert!(!MondayClientError::AuthError("bad token".into()).is_retryable());
        assert!(!MondayClientError::GraphQl {
            code: None,
            message: "invalid column".into()
        }
        .is_retryable());
        assert!(!MondayClientError::ResultTruncated {
            board_id: BoardId::from(1_u64),
            pages: 50
        }
        .is_retryable());
    }

    #[test]
    fn test_server_error_classification() {
        let e503 = MondayClientError::ApiError {
            status: 503,
            detail: "unavailable".into(),
        };
        let e400 = MondayClientError::ApiError {
            status: 400,
            detail: "bad request".into(),
        };
        assert!(e503.is_server_error());
        assert!(e503.is_retryable());
        assert!(!e400.is_server_error());
        assert!(!e400.is_retryable());
    }

    #[test]
    fn test_graphql_display_includes_code() {
        let err = MondayClientError::GraphQl {
            code: Some("InvalidColumnIdException".into()),
            message: "This column ID doesn't exist for the board".into(),
        };
        assert_eq!(
            err.to_string(),
            "GraphQL error [InvalidColumnIdException]: This column ID doesn't exist for the board"
        );

        let no_code = MondayClientError::GraphQl {
            code: None,
            message: "boom".into(),
        };
        assert_eq!(no_code.to_string(), "GraphQL error: boom");
    }

    #[test]
    fn test_retry_after_hint() {
        let err = MondayClientError::RateLimited {
            retry_after_secs: Some(42),
        };
        assert_eq!(err.retry_after_secs(), Some(42));
        assert_eq!(
            MondayClientError::Unreachable("x".into()).retry_after_secs(),
            None
        );
    }
}
