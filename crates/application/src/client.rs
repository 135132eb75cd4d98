//! The authenticated API client.

use std::sync::Arc;

use riptide_domain::{
    ApiError, ApiRequest, ApiResponse, ApiResult, AUTHORIZATION, Feature, FieldError, HttpMethod,
    StatusCode, UploadForm,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::RefreshCoordinator;
use crate::interceptor::{BearerAuth, RequestInterceptor, ResponseObserver, TraceObserver};
use crate::ports::{CancellationToken, HttpTransport, SessionStore};

/// Shape servers use for error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// One configured entry point to an API, bound to a feature.
///
/// Clients are cheap to clone; clones share the transport, the session
/// store, and the refresh coordinator, so a refresh triggered through one
/// clone renews the session for all of them.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    feature: Feature,
    interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    observers: Arc<[Arc<dyn ResponseObserver>]>,
    refresh: Option<Arc<RefreshCoordinator>>,
}

/// Assembles an [`ApiClient`], making the interceptor pipeline explicit.
///
/// The pipeline is fixed at construction: the bearer interceptor (unless
/// disabled) runs first, then caller-supplied interceptors in the order
/// they were added. Observers run in the order they were added, with the
/// tracing observer always last.
pub struct ApiClientBuilder {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    feature: Feature,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    observers: Vec<Arc<dyn ResponseObserver>>,
    refresh: Option<Arc<RefreshCoordinator>>,
    attach_bearer: bool,
}

impl ApiClientBuilder {
    /// Starts a builder for `feature` over `transport` and `store`.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        feature: Feature,
    ) -> Self {
        Self {
            transport,
            store,
            feature,
            interceptors: Vec::new(),
            observers: Vec::new(),
            refresh: None,
            attach_bearer: true,
        }
    }

    /// Enables automatic session renewal through `coordinator`.
    #[must_use]
    pub fn with_refresh(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.refresh = Some(coordinator);
        self
    }

    /// Disables the automatic bearer header for this client.
    #[must_use]
    pub fn without_bearer(mut self) -> Self {
        self.attach_bearer = false;
        self
    }

    /// Appends a request interceptor behind the built-in ones.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Appends a response observer ahead of the tracing observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ResponseObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Finishes the pipeline and returns the client.
    #[must_use]
    pub fn build(self) -> ApiClient {
        let mut interceptors: Vec<Arc<dyn RequestInterceptor>> = Vec::new();
        if self.attach_bearer {
            interceptors.push(Arc::new(BearerAuth::new(Arc::clone(&self.store))));
        }
        interceptors.extend(self.interceptors);

        let mut observers = self.observers;
        observers.push(Arc::new(TraceObserver));

        ApiClient {
            transport: self.transport,
            feature: self.feature,
            interceptors: interceptors.into(),
            observers: observers.into(),
            refresh: self.refresh,
        }
    }
}

impl ApiClient {
    /// Feature this client is dedicated to.
    #[must_use]
    pub const fn feature(&self) -> Feature {
        self.feature
    }

    /// Executes `request` through the interceptor pipeline.
    ///
    /// On a 401 from a client with renewal enabled, the request joins the
    /// shared refresh and is replayed exactly once with the new token;
    /// the `retried` flag on the request bounds this to a single replay
    /// no matter what the replay comes back with.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Transport`] when no HTTP response was produced.
    /// * [`ApiError::Status`] for non-success statuses.
    /// * [`ApiError::Refresh`] when renewing the session failed.
    /// * [`ApiError::Cancelled`] when `cancel` fired first.
    pub async fn execute(
        &self,
        mut request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ApiResponse> {
        request.feature = self.feature;
        for interceptor in self.interceptors.iter() {
            interceptor.before_send(&mut request);
        }

        let mut response = self.dispatch(&request, cancel).await?;

        if response.status == StatusCode::UNAUTHORIZED
            && !request.retried
            && let Some(coordinator) = &self.refresh
        {
            request.retried = true;
            match coordinator.refresh().await {
                Ok(tokens) => {
                    request.set_header(AUTHORIZATION, format!("Bearer {}", tokens.access_token));
                    response = self.dispatch(&request, cancel).await?;
                }
                Err(refresh_err) => {
                    let err = ApiError::from(refresh_err);
                    self.notify_error(&request, &err);
                    return Err(err);
                }
            }
        }

        if response.status.is_error() {
            return Err(Self::status_error(&response));
        }
        Ok(response)
    }

    /// Issues a GET and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); additionally [`ApiError::Decode`]
    /// when the body does not fit `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        let response = self
            .execute(ApiRequest::new(HttpMethod::Get, path), cancel)
            .await?;
        response.json()
    }

    /// Issues a POST with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        let response = self
            .execute(ApiRequest::new(HttpMethod::Post, path).with_json(body), cancel)
            .await?;
        response.json()
    }

    /// Issues a PUT with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        let response = self
            .execute(ApiRequest::new(HttpMethod::Put, path).with_json(body), cancel)
            .await?;
        response.json()
    }

    /// Issues a DELETE and returns the raw response.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ApiResponse> {
        self.execute(ApiRequest::new(HttpMethod::Delete, path), cancel)
            .await
    }

    /// Uploads a multipart form with a POST and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: UploadForm,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        let response = self
            .execute(
                ApiRequest::new(HttpMethod::Post, path).with_multipart(form),
                cancel,
            )
            .await?;
        response.json()
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ApiResponse> {
        match self.transport.send(request, cancel).await {
            Ok(response) => {
                self.notify_response(request, &response);
                Ok(response)
            }
            Err(transport_err) => {
                let err = ApiError::from(transport_err);
                self.notify_error(request, &err);
                Err(err)
            }
        }
    }

    fn notify_response(&self, request: &ApiRequest, response: &ApiResponse) {
        for observer in self.observers.iter() {
            observer.on_response(request, response);
        }
    }

    fn notify_error(&self, request: &ApiRequest, error: &ApiError) {
        for observer in self.observers.iter() {
            observer.on_error(request, error);
        }
    }

    /// Builds the status error for a non-success response, preferring the
    /// server's own message and field errors over the reason phrase.
    fn status_error(response: &ApiResponse) -> ApiError {
        let parsed: Option<ErrorBody> = serde_json::from_slice(&response.body).ok();
        let (message, fields) =
            parsed.map_or_else(|| (None, Vec::new()), |body| (body.message, body.errors));
        ApiError::Status {
            status: response.status.as_u16(),
            message: message.unwrap_or_else(|| response.status.reason_phrase().to_owned()),
            fields,
        }
    }
}
