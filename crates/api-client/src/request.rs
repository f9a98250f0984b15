//! Request and response records threaded through the pipeline

use crate::config::ClientConfig;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Per-call options; everything except `url` falls back to the client config
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Absolute URL or a path relative to the base URL
    pub url: String,
    /// HTTP method, GET when unset
    pub method: Option<Method>,
    /// Headers that override the stored ones key by key
    pub headers: HashMap<String, String>,
    /// Query parameters (GET/DELETE) or JSON body (POST/PUT)
    pub data: Option<Value>,
    /// Timeout override
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options for a URL with every other field defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach request data
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize and attach request data
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> serde_json::Result<Self> {
        Ok(self.data(serde_json::to_value(body)?))
    }

    /// Override the timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Fully merged configuration for one dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// Resolved URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Final header set
    pub headers: HashMap<String, String>,
    /// Query parameters or JSON body
    pub data: Option<Value>,
    /// Timeout handed to the transport
    pub timeout: Duration,
}

impl RequestConfig {
    /// Merge stored configuration with call options; call options win
    #[must_use]
    pub fn merge(defaults: &ClientConfig, options: RequestOptions) -> Self {
        let mut headers = defaults.headers.clone();
        headers.extend(options.headers);

        Self {
            url: defaults.resolve_url(&options.url),
            method: options.method.unwrap_or(Method::GET),
            headers,
            data: options.data,
            timeout: options.timeout.unwrap_or(defaults.timeout),
        }
    }

    /// Look up a header by exact name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Whether `data` travels in the query string
    #[must_use]
    pub fn sends_query(&self) -> bool {
        matches!(self.method, Method::GET | Method::DELETE | Method::HEAD)
    }
}

/// Response record built from a transport success
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Parsed body; response interceptors may replace it
    pub data: Value,
    /// Configuration the request was sent with
    pub config: RequestConfig,
}

/// Flatten JSON request data into query pairs
///
/// Objects become one pair per key, nulls are dropped, nested values are
/// sent as their JSON text.
#[must_use]
pub fn query_pairs(data: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = data else {
        return Vec::new();
    };

    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
