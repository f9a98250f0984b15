//! Request/response logging

use crate::error::{ApiError, ApiResult};
use crate::interceptor::{RequestInterceptor, ResponseInterceptor};
use crate::request::{RequestConfig, Response};
use async_trait::async_trait;
use tracing::debug;

/// Logs both stages at debug level; headers and bodies are never logged
#[derive(Clone, Copy, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn on_request(&self, config: RequestConfig) -> ApiResult<RequestConfig> {
        debug!(target: "iweekly::http", method = %config.method, url = %config.url, "sending request");
        Ok(config)
    }
}

#[async_trait]
impl ResponseInterceptor for LoggingInterceptor {
    async fn on_response(&self, response: Response) -> ApiResult<Response> {
        debug!(
            target: "iweekly::http",
            method = %response.config.method,
            url = %response.config.url,
            status = response.status,
            "response received"
        );
        Ok(response)
    }

    async fn on_response_error(&self, error: ApiError) -> ApiResult<Response> {
        debug!(target: "iweekly::http", err = %error, "response rejected");
        Err(error)
    }
}
