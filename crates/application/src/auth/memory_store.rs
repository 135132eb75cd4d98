//! In-memory session store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use riptide_domain::{AuthSession, TokenPair};
use serde_json::Value;

use crate::ports::SessionStore;

/// Session store held entirely in memory.
///
/// Used by tests and short-lived tools where nothing should outlive the
/// process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<AuthSession>,
}

impl MemorySessionStore {
    /// Creates an empty, signed-out store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AuthSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self) -> AuthSession {
        self.lock().clone()
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        self.lock().apply_tokens(tokens);
    }

    fn set_cached_user(&self, user: Option<Value>) {
        self.lock().apply_user(user);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::ports::SessionStoreExt;

    #[test]
    fn test_store_round_trip() {
        let store = MemorySessionStore::new();
        store.set_tokens(&TokenPair::new("a1", "r1"));
        store.set_cached_user(Some(json!({"id": 1, "name": "admin"})));

        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
        assert!(store.snapshot().is_authenticated());
    }

    #[test]
    fn test_clear_signs_out() {
        let store = MemorySessionStore::new();
        store.set_tokens(&TokenPair::new("a1", "r1"));
        store.clear();
        assert_eq!(store.snapshot(), AuthSession::default());
    }

    #[test]
    fn test_cached_user_deserializes_into_caller_type() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Profile {
            id: u64,
            name: String,
        }

        let store = MemorySessionStore::new();
        store.set_cached_user(Some(json!({"id": 1, "name": "admin"})));

        assert_eq!(
            store.cached_user_as::<Profile>(),
            Some(Profile {
                id: 1,
                name: "admin".into()
            })
        );
    }

    #[test]
    fn test_mismatched_cached_user_reads_as_none() {
        #[derive(Debug, serde::Deserialize)]
        struct Profile {
            #[allow(dead_code)]
            id: u64,
        }

        let store = MemorySessionStore::new();
        store.set_cached_user(Some(json!("not-an-object")));
        assert!(store.cached_user_as::<Profile>().is_none());
    }
}
