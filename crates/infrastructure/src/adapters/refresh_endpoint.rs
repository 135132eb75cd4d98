//! Token exchange against the auth service.

use std::time::Duration;

use async_trait::async_trait;
use riptide_application::RefreshEndpoint;
use riptide_domain::{RefreshError, TokenPair};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshReply {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshErrorReply {
    #[serde(default)]
    message: Option<String>,
}

/// Exchanges refresh tokens at the auth service's refresh route.
///
/// Talks to the service with a bare client on purpose: the exchange must
/// never pass through the interceptor pipeline it is rescuing.
pub struct HttpRefreshEndpoint {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpRefreshEndpoint {
    /// Creates an endpoint that exchanges tokens at `url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl RefreshEndpoint for HttpRefreshEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|err| RefreshError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RefreshError::Network(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RefreshErrorReply>(&body)
                .ok()
                .and_then(|reply| reply.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("refresh rejected")
                        .to_owned()
                });
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply: RefreshReply = serde_json::from_slice(&body)
            .map_err(|err| RefreshError::MalformedResponse(err.to_string()))?;
        if reply.access_token.is_empty() || reply.refresh_token.is_empty() {
            return Err(RefreshError::MalformedResponse(
                "token pair is incomplete".to_owned(),
            ));
        }
        Ok(TokenPair::new(reply.access_token, reply.refresh_token))
    }
}
