//! HTTP transport: one outbound call per request, never retried

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bookcheck_core::{AuthToken, RequestSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
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

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request against the booking service, relative to its base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Sent as `Cookie: token=<value>`
    pub token: Option<AuthToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            token: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Operation label, e.g. "PUT /booking/12"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Snapshot for reports; the token value is masked.
    #[must_use]
    pub fn snapshot(&self, base_url: &str) -> RequestSnapshot {
        let mut headers = HashMap::new();
        if self.token.is_some() {
            headers.insert("Cookie".to_string(), "token=***".to_string());
        }
        RequestSnapshot {
            method: self.method.to_string(),
            url: format!("{base_url}{}", self.path),
            headers,
            body: self.body.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Seconds spent on the call
    pub elapsed: f64,
}

impl ApiResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Sends one request and returns whatever the service answered.
///
/// Any status is a response; only calls that never got one are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Base URL used to render request snapshots.
    fn base_url(&self) -> &str;
}

/// reqwest-backed transport with a fixed per-call timeout.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut req = self.client.request(method, &url);
        if let Some(token) = &request.token {
            req = req.header(reqwest::header::COOKIE, token.cookie());
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let start = Instant::now();
        let resp = req.send().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Request(e.to_string())
            }
        })?;
        let elapsed = start.elapsed().as_secs_f64();

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed,
            "call finished"
        );

        Ok(ApiResponse {
            status,
            body,
            elapsed,
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(String),
}
