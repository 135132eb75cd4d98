//! Durable authentication session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::TokenPair;

/// Everything the client persists about the signed-in user.
///
/// All fields are optional: a missing or unreadable store is equivalent to
/// a signed-out session, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token attached to authenticated requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token exchanged for a fresh pair once the access token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Cached profile of the signed-in user, kept as opaque JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// When any part of the session last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Returns `true` when an access token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns the stored tokens as a pair when both are present.
    #[must_use]
    pub fn token_pair(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => {
                Some(TokenPair::new(access.clone(), refresh.clone()))
            }
            _ => None,
        }
    }

    /// Replaces both tokens and stamps the update time.
    pub fn apply_tokens(&mut self, tokens: &TokenPair) {
        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
        self.updated_at = Some(Utc::now());
    }

    /// Replaces the cached user profile and stamps the update time.
    pub fn apply_user(&mut self, user: Option<Value>) {
        self.user = user;
        self.updated_at = Some(Utc::now());
    }

    /// Resets to a signed-out session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_session_is_signed_out() {
        let session = AuthSession::default();
        assert!(!session.is_authenticated());
        assert_eq!(session.token_pair(), None);
    }

    #[test]
    fn test_apply_tokens_stamps_update_time() {
        let mut session = AuthSession::default();
        session.apply_tokens(&TokenPair::new("a1", "r1"));

        assert!(session.is_authenticated());
        assert_eq!(session.token_pair(), Some(TokenPair::new("a1", "r1")));
        assert!(session.updated_at.is_some());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = AuthSession::default();
        session.apply_tokens(&TokenPair::new("a1", "r1"));
        session.apply_user(Some(json!({"id": 7})));

        session.clear();

        assert_eq!(session, AuthSession::default());
    }

    #[test]
    fn test_partial_session_has_no_token_pair() {
        let session = AuthSession {
            access_token: Some("a1".into()),
            ..AuthSession::default()
        };
        assert!(session.is_authenticated());
        assert_eq!(session.token_pair(), None);
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let mut session = AuthSession::default();
        session.apply_tokens(&TokenPair::new("a1", "r1"));
        session.apply_user(Some(json!({"name": "admin"})));

        let text = serde_json::to_string(&session).unwrap();
        let restored: AuthSession = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, session);
    }
}
