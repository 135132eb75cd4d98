//! Request model handed to the transport.

use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::feature::Feature;
use crate::upload::UploadForm;

/// Canonical name of the authorization header.
pub const AUTHORIZATION: &str = "Authorization";

/// HTTP methods the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical uppercase method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name as it will appear on the wire.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a header from a name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payload attached to a request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No payload.
    #[default]
    Empty,
    /// JSON payload, sent as `application/json`.
    Json(Value),
    /// Multipart form payload for file uploads.
    Multipart(UploadForm),
}

impl RequestBody {
    /// Returns `true` when there is no payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A single API call, fully described before it reaches the transport.
///
/// Interceptors mutate the request in place; the transport reads it. The
/// `retried` flag is what bounds replay after a token refresh to one
/// attempt per request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Unique id correlating log lines for this call.
    pub id: Uuid,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the client's base URL.
    pub path: String,
    /// Query parameters appended to the path.
    pub query: Vec<(String, String)>,
    /// Headers attached so far, in application order.
    pub headers: Vec<Header>,
    /// Payload.
    pub body: RequestBody,
    /// Functional area of the client issuing the call.
    pub feature: Feature,
    /// Per-request timeout override.
    pub timeout: Option<Duration>,
    /// Whether this call has already been replayed after a token refresh.
    pub retried: bool,
}

impl ApiRequest {
    /// Creates a request for `method` and `path` with no payload.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            feature: Feature::Generic,
            timeout: None,
            retried: false,
        }
    }

    /// Attaches a JSON payload.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Attaches a multipart payload.
    #[must_use]
    pub fn with_multipart(mut self, form: UploadForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends a header without touching existing ones of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Overrides the transport timeout for this call only.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns `true` when a header named `name` is already present.
    ///
    /// Names compare case-insensitively, so a caller-supplied
    /// `authorization` suppresses the automatic `Authorization` header.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|header| header.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value of the first header named `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Sets `name` to `value`, replacing any existing occurrences.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|header| !header.name.eq_ignore_ascii_case(&name));
        self.headers.push(Header::new(name, value));
    }
}
