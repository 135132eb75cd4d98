//! HTTP transport backed by `reqwest`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use riptide_application::{CancellationToken, HttpTransport, TransportError};
use riptide_domain::{ApiRequest, ApiResponse, HttpMethod, RequestBody, UploadForm, UploadPayload};
use url::Url;

/// Transport that dispatches requests with a shared `reqwest` client.
///
/// The base URL is fixed per transport; request paths are joined onto it.
/// Default headers are attached only when the request does not already
/// carry a header with the same name.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    default_headers: Vec<(String, String)>,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport rooted at `base_url`.
    ///
    /// A base URL without a trailing slash would drop its last path
    /// segment when joined, so one is appended here.
    #[must_use]
    pub fn new(client: reqwest::Client, mut base_url: Url, timeout: Duration) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            default_headers: Vec::new(),
            timeout,
        }
    }

    /// Adds a header attached to every request that does not already set
    /// one with the same name.
    #[must_use]
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    fn build_url(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        if !request.query.is_empty() {
            let encoded = serde_urlencoded::to_string(&request.query)
                .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&merged));
        }
        Ok(url)
    }

    async fn attach_body(
        builder: reqwest::RequestBuilder,
        body: &RequestBody,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        Ok(match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form).await?),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse, TransportError> {
        if let Some(token) = cancel
            && token.is_cancelled()
        {
            return Err(TransportError::Cancelled);
        }

        let url = self.build_url(request)?;
        let timeout = request.timeout.unwrap_or(self.timeout);
        let mut builder = self
            .client
            .request(request_method(request.method), url)
            .timeout(timeout);
        for header in &request.headers {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        for (name, value) in &self.default_headers {
            if !request.has_header(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        let builder = Self::attach_body(builder, &request.body).await?;

        let exchange = async move {
            let started = Instant::now();
            let reply = builder
                .send()
                .await
                .map_err(|err| map_reqwest_error(&err, timeout))?;
            let status = reply.status().as_u16();
            let headers = reply
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_owned(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = reply
                .bytes()
                .await
                .map_err(|err| map_reqwest_error(&err, timeout))?
                .to_vec();
            Ok(ApiResponse::new(status, headers, body, started.elapsed()))
        };

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(TransportError::Cancelled),
                    outcome = exchange => outcome,
                }
            }
            None => exchange.await,
        }
    }
}

fn request_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_reqwest_error(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout {
            timeout_ms: timeout.as_millis(),
        };
    }
    if err.is_connect() {
        return TransportError::Connect(err.to_string());
    }
    if err.is_body() || err.is_decode() {
        return TransportError::Body(err.to_string());
    }
    TransportError::Other(err.to_string())
}

async fn multipart_form(form: &UploadForm) -> Result<reqwest::multipart::Form, TransportError> {
    let mut multipart = reqwest::multipart::Form::new();
    for part in &form.parts {
        let piece = match &part.payload {
            UploadPayload::Text(value) => reqwest::multipart::Part::text(value.clone()),
            UploadPayload::Bytes { file_name, data } => {
                file_part(file_name.clone(), data.clone())?
            }
            UploadPayload::File(path) => {
                let data = tokio::fs::read(path)
                    .await
                    .map_err(|err| TransportError::Body(err.to_string()))?;
                let file_name = path.file_name().map_or_else(
                    || "file".to_owned(),
                    |name| name.to_string_lossy().into_owned(),
                );
                file_part(file_name, data)?
            }
        };
        multipart = multipart.part(part.name.clone(), piece);
    }
    Ok(multipart)
}

fn file_part(file_name: String, data: Vec<u8>) -> Result<reqwest::multipart::Part, TransportError> {
    let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
    reqwest::multipart::Part::bytes(data)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|err| TransportError::Body(err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_join_preserves_base_path() {
        let transport = transport("http://localhost:3000/api");
        let request = ApiRequest::new(HttpMethod::Get, "/auth/login");
        let url = transport.build_url(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn test_query_parameters_are_encoded() {
        let transport = transport("http://localhost:3000/api/");
        let request = ApiRequest::new(HttpMethod::Get, "products")
            .with_query("page", "2")
            .with_query("search", "blue widget");
        let url = transport.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/products?page=2&search=blue+widget"
        );
    }

    #[test]
    fn test_query_merges_with_inline_query() {
        let transport = transport("http://localhost:3000/api");
        let request =
            ApiRequest::new(HttpMethod::Get, "products?page=2").with_query("limit", "10");
        let url = transport.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/products?page=2&limit=10"
        );
    }
}
