//! Durable session storage port.

use riptide_domain::{AuthSession, TokenPair};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Durable storage for the authentication session.
///
/// The store is deliberately infallible: a missing or corrupt backing
/// store reads as a signed-out session, and failed writes are logged by
/// the implementation rather than surfaced. Reads are synchronous so
/// interceptors can consult the store on the request path.
pub trait SessionStore: Send + Sync {
    /// Returns a point-in-time copy of the stored session.
    fn snapshot(&self) -> AuthSession;

    /// Replaces both tokens.
    fn set_tokens(&self, tokens: &TokenPair);

    /// Replaces the cached user profile.
    fn set_cached_user(&self, user: Option<Value>);

    /// Resets to a signed-out session.
    fn clear(&self);

    /// Returns the stored access token.
    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    /// Returns the stored refresh token.
    fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_token
    }

    /// Returns both tokens, present only when the pair is complete.
    fn tokens(&self) -> Option<TokenPair> {
        self.snapshot().token_pair()
    }

    /// Returns the cached user profile as raw JSON.
    fn cached_user(&self) -> Option<Value> {
        self.snapshot().user
    }
}

/// Typed access to the cached user profile.
pub trait SessionStoreExt: SessionStore {
    /// Deserializes the cached user into `T`.
    ///
    /// Returns `None` when no profile is cached or the cached value does
    /// not fit `T`; a stale or corrupt cache never causes an error.
    fn cached_user_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.snapshot()
            .user
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}
