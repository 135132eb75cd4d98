//! Access and refresh token pair.

use serde::{Deserialize, Serialize};

/// A bearer access token together with the refresh token used to renew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token attached to outgoing requests.
    pub access_token: String,
    /// Long-lived token exchanged for a fresh pair once the access token
    /// expires.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair from its two parts.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Shortens a token to a loggable preview.
///
/// Tokens never appear whole in logs; only the first few characters are
/// kept so operators can correlate rotations.
#[must_use]
pub fn token_preview(token: &str) -> String {
    const VISIBLE: usize = 8;
    let mut head: String = token.chars().take(VISIBLE).collect();
    if token.chars().count() > VISIBLE {
        head.push_str("...");
    }
    head
}
