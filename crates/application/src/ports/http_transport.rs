//! Transport port for dispatching requests.

use async_trait::async_trait;
use riptide_domain::{ApiError, ApiRequest, ApiResponse};
use thiserror::Error;

use super::CancellationToken;

/// Errors surfaced by a transport implementation.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The path or query could not be combined into a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds.
        timeout_ms: u128,
    },
    /// A connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request body could not be prepared or streamed.
    #[error("request body failed: {0}")]
    Body(String),
    /// The caller cancelled the request.
    #[error("request was cancelled")]
    Cancelled,
    /// Any other transport-level failure.
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => Self::Cancelled,
            TransportError::Timeout { timeout_ms } => Self::Transport {
                message: format!("request timed out after {timeout_ms} ms"),
                timed_out: true,
            },
            other => Self::Transport {
                message: other.to_string(),
                timed_out: false,
            },
        }
    }
}

/// Dispatches a described request and buffers the full response.
///
/// Implementations return `Ok` for every HTTP response regardless of
/// status; the client layer decides which statuses are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request`, honoring `cancel` while the exchange is in flight.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was produced.
    async fn send(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_timed_out_transport_error() {
        let err = ApiError::from(TransportError::Timeout { timeout_ms: 250 });
        assert!(matches!(
            err,
            ApiError::Transport { timed_out: true, .. }
        ));
    }

    #[test]
    fn test_cancellation_maps_to_typed_cancellation() {
        let err = ApiError::from(TransportError::Cancelled);
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_connect_failure_is_not_a_timeout() {
        let err = ApiError::from(TransportError::Connect("refused".into()));
        assert!(matches!(
            err,
            ApiError::Transport { timed_out: false, .. }
        ));
    }
}
