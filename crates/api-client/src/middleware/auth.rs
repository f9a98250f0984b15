//! Bearer token injection

use crate::endpoints::PUBLIC_PATHS;
use crate::error::ApiResult;
use crate::interceptor::RequestInterceptor;
use crate::platform::{Platform, Toast};
use crate::request::RequestConfig;
use async_trait::async_trait;
use tracing::warn;

/// Toast shown when a protected endpoint is called without a token
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in first";

/// Adds `Authorization: Bearer <token>` to every non-public request
///
/// A missing token does not fail the request; the user is told to log in and
/// the server gets to decide.
pub struct AuthInterceptor {
    platform: Platform,
    public_paths: Vec<String>,
}

impl AuthInterceptor {
    /// Interceptor using the built-in public path list
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            public_paths: PUBLIC_PATHS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the public path list
    #[must_use]
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a URL needs a token
    #[must_use]
    pub fn requires_token(&self, url: &str) -> bool {
        !self.public_paths.iter().any(|path| url.contains(path.as_str()))
    }
}

#[async_trait]
impl RequestInterceptor for AuthInterceptor {
    async fn on_request(&self, mut config: RequestConfig) -> ApiResult<RequestConfig> {
        if !self.requires_token(&config.url) {
            return Ok(config);
        }

        match self.platform.tokens.token() {
            Some(token) => {
                config
                    .headers
                    .insert("Authorization".to_string(), format!("Bearer {token}"));
            }
            None => {
                warn!(url = %config.url, "Endpoint requires a token but none is stored");
                self.platform
                    .notifier
                    .toast(&Toast::info(LOGIN_REQUIRED_MESSAGE));
            }
        }

        Ok(config)
    }
}
