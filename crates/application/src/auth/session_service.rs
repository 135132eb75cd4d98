//! Sign-in and sign-out workflows.

use std::sync::Arc;

use riptide_domain::{ApiRequest, ApiResult, AUTHORIZATION, HttpMethod, TokenPair};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::ports::{SessionStore, SessionStoreExt};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginReply {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    user: Option<Value>,
}

/// Sign-in, sign-out, and profile workflows bound to the auth client.
///
/// The auth client carries no bearer of its own, so this service attaches
/// the stored token explicitly where an endpoint wants one.
pub struct SessionService {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    /// Creates a service over the auth-feature `client` and the shared
    /// session `store`.
    #[must_use]
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { client, store }
    }

    fn with_bearer(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(token) = self.store.access_token() {
            request = request.with_header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }

    /// Signs in with `email` and `password`, persisting the returned
    /// session.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection untouched; the stored session is
    /// only modified on success.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let reply: LoginReply = self
            .client
            .post_json(
                "/auth/login",
                json!({ "email": email, "password": password }),
                None,
            )
            .await?;

        self.store
            .set_tokens(&TokenPair::new(reply.access_token, reply.refresh_token));
        if reply.user.is_some() {
            self.store.set_cached_user(reply.user);
        }
        Ok(())
    }

    /// Fetches the signed-in user's profile and caches it.
    ///
    /// # Errors
    ///
    /// Returns the underlying request error; the cache is left untouched
    /// on failure.
    pub async fn bootstrap_user(&self) -> ApiResult<Value> {
        let request = self.with_bearer(ApiRequest::new(HttpMethod::Get, "/auth/me"));
        let user: Value = self.client.execute(request, None).await?.json()?;
        self.store.set_cached_user(Some(user.clone()));
        Ok(user)
    }

    /// Signs out, clearing the local session regardless of whether the
    /// server acknowledged the sign-out.
    pub async fn logout(&self) {
        let request = self.with_bearer(ApiRequest::new(HttpMethod::Post, "/auth/logout"));
        if let Err(err) = self.client.execute(request, None).await {
            tracing::debug!(error = %err, "sign-out request failed; clearing session anyway");
        }
        self.store.clear();
    }

    /// Returns the cached user profile deserialized into `T`.
    #[must_use]
    pub fn current_user<T: DeserializeOwned>(&self) -> Option<T> {
        self.store.cached_user_as()
    }

    /// Returns `true` when an access token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.snapshot().is_authenticated()
    }
}
