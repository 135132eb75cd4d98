//! Token exchange port.

use async_trait::async_trait;
use riptide_domain::{RefreshError, TokenPair};

/// Exchanges a refresh token for a fresh token pair.
///
/// Implementations talk to the auth service directly and never route
/// through the interceptor pipeline, so a failing refresh can never
/// trigger another refresh.
#[async_trait]
pub trait RefreshEndpoint: Send + Sync {
    /// Exchanges `refresh_token` for a new pair.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] describing why no pair was produced.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError>;
}
