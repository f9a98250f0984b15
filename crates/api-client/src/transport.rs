//! Host transport boundary
//!
//! The executor never talks to the network itself; it hands a merged
//! [`RequestConfig`] to a [`Transport`] and gets back a [`RawResponse`].
//! [`ReqwestTransport`] is the default host; tests and embedders plug in
//! their own.

use crate::request::{query_pairs, RequestConfig};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// What the host returns for any completed HTTP exchange, whatever the status
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Body parsed as JSON, or a JSON string when it is not JSON
    pub body: Value,
}

impl RawResponse {
    /// Response with a JSON body and no headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }
}

/// The host could not complete the exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Failure description
    pub message: String,
    /// Whether the configured timeout elapsed
    pub timeout: bool,
}

impl TransportError {
    /// Create a transport failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    /// Create a timeout failure
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// Multipart file upload description
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Resolved URL
    pub url: String,
    /// Local file to send
    pub file_path: PathBuf,
    /// Multipart field name for the file
    pub name: String,
    /// Extra text fields
    pub form_data: HashMap<String, String>,
    /// Final header set
    pub headers: HashMap<String, String>,
    /// Timeout handed to the host
    pub timeout: Duration,
}

/// Host request primitive
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request; any HTTP status counts as success
    async fn send(&self, request: &RequestConfig) -> Result<RawResponse, TransportError>;

    /// Upload a file as multipart form data
    async fn upload(&self, request: &UploadRequest) -> Result<RawResponse, TransportError>;
}

/// Transport backed by `reqwest`
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool
    pub fn new() -> Result<Self, TransportError> {
        let inner = Client::builder()
            .user_agent(concat!("iweekly-api-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }

    async fn read_response(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let text = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body: parse_body(&text),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestConfig) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .inner
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(data) = &request.data {
            builder = if request.sends_query() {
                builder.query(&query_pairs(data))
            } else {
                builder.json(data)
            };
        }

        debug!(method = %request.method, url = %request.url, "Dispatching request");
        let response = builder.send().await?;
        Self::read_response(response).await
    }

    async fn upload(&self, request: &UploadRequest) -> Result<RawResponse, TransportError> {
        let bytes = tokio::fs::read(&request.file_path).await.map_err(|e| {
            TransportError::new(format!(
                "cannot read {}: {e}",
                request.file_path.display()
            ))
        })?;

        let file_name = request
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.name.clone());

        let mut form = Form::new().part(request.name.clone(), Part::bytes(bytes).file_name(file_name));
        for (key, value) in &request.form_data {
            form = form.text(key.clone(), value.clone());
        }

        let mut builder = self
            .inner
            .post(&request.url)
            .timeout(request.timeout)
            .multipart(form);

        // reqwest sets its own multipart boundary header
        for (name, value) in &request.headers {
            if !name.eq_ignore_ascii_case("content-type") {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        debug!(url = %request.url, file = %request.file_path.display(), "Uploading file");
        let response = builder.send().await?;
        Self::read_response(response).await
    }
}

/// Parse a body as JSON, keeping non-JSON text as a string value
#[must_use]
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
