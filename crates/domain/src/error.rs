//! Error taxonomy for the authenticated client.
//!
//! Callers match on these variants to distinguish transport failures,
//! server-reported errors, session expiry, and deliberate cancellation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias for results produced by the client.
pub type ApiResult<T> = Result<T, ApiError>;

/// A single field-level validation failure reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of what is wrong with it.
    pub message: String,
}

/// Why a token refresh did not produce a new token pair.
///
/// The coordinator fans a single refresh outcome out to every caller that
/// was waiting on it, so this type is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token is stored, so there is nothing to exchange.
    #[error("no refresh token is stored")]
    MissingToken,
    /// The auth service rejected the refresh token.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status returned by the refresh endpoint.
        status: u16,
        /// Message extracted from the response body, if any.
        message: String,
    },
    /// The refresh request never produced an HTTP response.
    #[error("refresh request failed: {0}")]
    Network(String),
    /// The refresh endpoint answered 2xx but the body was not a token pair.
    #[error("refresh response was malformed: {0}")]
    MalformedResponse(String),
    /// The in-flight refresh was abandoned before it settled.
    #[error("refresh was interrupted before completing")]
    Interrupted,
}

impl RefreshError {
    /// Returns `true` when the failure ended the session and the user must
    /// sign in again.
    ///
    /// An interrupted refresh leaves the stored session untouched; every
    /// other failure clears it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Interrupted)
    }
}

/// Anything that can go wrong while executing a request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the underlying I/O failure.
        message: String,
        /// Whether the failure was a client-side timeout.
        timed_out: bool,
    },
    /// The server answered with a non-success status.
    #[error("server answered {status}: {message}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Message extracted from the response body, or the standard
        /// reason phrase when the body carried none.
        message: String,
        /// Field-level validation failures, populated for 422 responses.
        fields: Vec<FieldError>,
    },
    /// Renewing the access token failed, ending the session.
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    /// The response arrived but its body could not be decoded.
    #[error("could not decode response body: {0}")]
    Decode(String),
    /// The caller cancelled the request before it completed.
    #[error("request was cancelled")]
    Cancelled,
}

impl ApiError {
    /// Returns `true` for deliberate cancellation, which callers usually
    /// swallow instead of surfacing.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the HTTP status when the server produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the validation failures attached to a 422 response.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Status { fields, .. } => fields,
            _ => &[],
        }
    }
}
