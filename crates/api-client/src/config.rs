//! Configuration for the iweekly API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Default production API URL
pub const DEFAULT_BASE_URL: &str = "https://service.iweekly.top/api";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development server
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        Self::parse(&env::var("IWEEKLY_ENV").unwrap_or_default())
    }

    /// Parse an environment name, falling back to production
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Client configuration store
///
/// Owned by an [`ApiClient`](crate::ApiClient); each request merges a fresh
/// copy of it with the call options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for relative request paths
    pub base_url: String,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
    /// Request timeout
    #[serde(with = "millis_serde")]
    pub timeout: Duration,
    /// Current environment
    pub environment: Environment,
}

mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Headers every client starts with
fn default_headers() -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: default_headers(),
            timeout: DEFAULT_TIMEOUT,
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `IWEEKLY_ENV`: Environment preset (development/staging/production)
    /// - `IWEEKLY_API_URL`: Base URL, overrides the preset
    /// - `IWEEKLY_TIMEOUT_MS`: Request timeout in milliseconds
    pub fn from_env() -> ApiResult<Self> {
        let mut config = match Environment::from_env() {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        };

        if let Ok(url) = env::var("IWEEKLY_API_URL") {
            config.base_url = url;
        }

        if let Ok(raw) = env::var("IWEEKLY_TIMEOUT_MS") {
            let millis: u64 = raw
                .parse()
                .map_err(|_| ApiError::config(format!("IWEEKLY_TIMEOUT_MS is not a number: {raw}")))?;
            config.timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create development configuration (local server)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            environment: Environment::Development,
            ..Self::default()
        }
    }

    /// Create staging configuration
    #[must_use]
    pub fn staging() -> Self {
        Self {
            base_url: env::var("IWEEKLY_STAGING_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            environment: Environment::Staging,
            ..Self::default()
        }
    }

    /// Create production configuration
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to add a default header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve a request path against the base URL
    ///
    /// Paths that already start with `http` are used unchanged; everything
    /// else is appended to the base URL as-is.
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !is_absolute(&self.base_url) {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

/// Whether a URL carries an http(s) scheme
pub(crate) fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
