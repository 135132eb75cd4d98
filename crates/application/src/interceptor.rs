//! Interceptor pipeline applied around every request.
//!
//! Request interceptors run in a fixed order decided when the client is
//! built; observers see every settled exchange but never alter it.

use std::sync::Arc;

use riptide_domain::{ApiError, ApiRequest, ApiResponse, AUTHORIZATION};

use crate::ports::SessionStore;

/// Mutates outgoing requests before they reach the transport.
pub trait RequestInterceptor: Send + Sync {
    /// Applies this interceptor to `request`.
    fn before_send(&self, request: &mut ApiRequest);
}

/// Observes settled exchanges without altering them.
pub trait ResponseObserver: Send + Sync {
    /// Called for every HTTP response, success and error statuses alike.
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse);

    /// Called when a request settles without a usable HTTP response:
    /// transport failures, refresh failures, and cancellation.
    fn on_error(&self, request: &ApiRequest, error: &ApiError);
}

/// Attaches `Authorization: Bearer <token>` from the session store.
///
/// A header the caller set explicitly always wins, and requests go out
/// untouched when no token is stored. The token is read from the store on
/// every request, so a refresh that lands between two requests is picked
/// up without rebuilding the client.
pub struct BearerAuth {
    store: Arc<dyn SessionStore>,
}

impl BearerAuth {
    /// Creates the interceptor over the shared session store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerAuth {
    fn before_send(&self, request: &mut ApiRequest) {
        if request.has_header(AUTHORIZATION) {
            return;
        }
        if let Some(token) = self.store.access_token() {
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }
    }
}

/// Logs every settled exchange through `tracing`.
///
/// Cancellations log at debug level so a dropped screen does not read as
/// a failure; everything else that failed logs at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceObserver;

impl ResponseObserver for TraceObserver {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) {
        if response.status.is_error() {
            tracing::warn!(
                id = %request.id,
                feature = %request.feature,
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                elapsed_ms = %response.elapsed.as_millis(),
                "request failed"
            );
        } else {
            tracing::debug!(
                id = %request.id,
                feature = %request.feature,
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                elapsed_ms = %response.elapsed.as_millis(),
                "request completed"
            );
        }
    }

    fn on_error(&self, request: &ApiRequest, error: &ApiError) {
        if error.is_cancelled() {
            tracing::debug!(
                id = %request.id,
                feature = %request.feature,
                method = %request.method,
                path = %request.path,
                "request cancelled"
            );
        } else {
            tracing::warn!(
                id = %request.id,
                feature = %request.feature,
                method = %request.method,
                path = %request.path,
                error = %error,
                "request errored"
            );
        }
    }
}
