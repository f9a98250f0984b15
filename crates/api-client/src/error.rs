//! Error types for the API client

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Status classifications shared by the executor and the middleware
pub mod status {
    /// Successful response
    pub const SUCCESS: i32 = 200;
    /// Missing or expired session
    pub const UNAUTHORIZED: i32 = 401;
    /// Access denied
    pub const FORBIDDEN: i32 = 403;
    /// Resource does not exist
    pub const NOT_FOUND: i32 = 404;
    /// Internal server error
    pub const SERVER_ERROR: i32 = 500;
    /// Synthesized for transport failures
    pub const NETWORK_ERROR: i32 = -1;
}

/// Fallback text used when the server gives no usable message
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The transport could not complete the round-trip
    #[error("Network error: {message}")]
    Network {
        /// Transport failure description
        message: String,
        /// Whether the transport gave up because of the timeout
        timeout: bool,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The transport succeeded but the envelope reports a failure
    #[error("{message}")]
    Business {
        /// Envelope `code`, absent for bare payloads
        code: Option<i64>,
        /// Envelope message
        message: String,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request URL is empty or could not be resolved to an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Local I/O failed (reading an upload source)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: false,
        }
    }

    /// Create a network error caused by a timeout
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: true,
        }
    }

    /// Create an HTTP status error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a business error from an envelope
    pub fn business(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Business {
            code,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Numeric classification: HTTP status, `-1` for network failures
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Network { .. } => Some(status::NETWORK_ERROR),
            Self::Http { status, .. } => Some(i32::from(*status)),
            _ => None,
        }
    }

    /// The bare message carried by the error
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Network { message, .. } | Self::Business { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Text suitable for a toast
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { timeout: true, .. } => "Request timed out".to_string(),
            Self::Network { .. } => "Network connection failed".to_string(),
            Self::Http { status, .. } => match i32::from(*status) {
                status::UNAUTHORIZED => "Unauthorized, please log in again".to_string(),
                status::FORBIDDEN => "Access denied".to_string(),
                status::NOT_FOUND => "Requested resource not found".to_string(),
                status::SERVER_ERROR => "Internal server error".to_string(),
                _ => self.to_string(),
            },
            Self::Business { message, .. } => message.clone(),
            _ => "Network request failed".to_string(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Business { .. }
            | Self::Json(_)
            | Self::Config(_)
            | Self::InvalidUrl(_)
            | Self::Io(_) => false,
        }
    }

    /// Check if the server rejected the session
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(status::UNAUTHORIZED)
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status >= 500)
    }
}
