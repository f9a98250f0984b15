//! Envelope unwrapping and response error handling

use crate::envelope::unwrap_envelope;
use crate::error::{ApiError, ApiResult};
use crate::interceptor::ResponseInterceptor;
use crate::platform::{Platform, Toast};
use crate::request::Response;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Toast shown when the server rejects the session
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";

/// Server message that the auth interceptor already told the user about
const TOKEN_MISSING_MARKER: &str = "access_token missing";

/// Replaces `Response::data` with the unwrapped envelope payload
///
/// Only 2xx responses are unwrapped; any other status fails with
/// [`ApiError::Http`]. An empty 2xx body (such as 204) resolves to `null`. Failures from this stage are surfaced to the user here:
/// 401 clears the stored token and ends the session, everything else becomes
/// a toast.
pub struct EnvelopeInterceptor {
    platform: Platform,
    login_route: Option<String>,
}

impl EnvelopeInterceptor {
    /// Interceptor without a login redirect
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            login_route: None,
        }
    }

    /// Navigate here after the session expires
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = Some(route.into());
        self
    }

    fn end_session(&self) {
        self.platform.tokens.clear_token();
        self.platform
            .notifier
            .toast(&Toast::info(SESSION_EXPIRED_MESSAGE));

        if let Some(route) = &self.login_route {
            self.platform.navigate(route);
        }
    }
}

#[async_trait]
impl ResponseInterceptor for EnvelopeInterceptor {
    async fn on_response(&self, mut response: Response) -> ApiResult<Response> {
        if !is_success(response.status) {
            let message = match &response.data {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            return Err(ApiError::http(response.status, message));
        }

        let body = std::mem::take(&mut response.data);
        response.data = unwrap_envelope(body)?;
        Ok(response)
    }

    async fn on_response_error(&self, error: ApiError) -> ApiResult<Response> {
        if error.is_unauthorized() {
            warn!("Session rejected by server, clearing token");
            self.end_session();
        } else if error.message().contains(TOKEN_MISSING_MARKER) {
            debug!(error = %error, "Suppressing duplicate login prompt");
        } else {
            self.platform
                .notifier
                .toast(&Toast::info(error.user_message()));
        }

        Err(error)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::platform::{MemoryTokenStore, Navigator, Notifier, TokenStore};
    use crate::request::{RequestConfig, RequestOptions};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        toasts: Mutex<Vec<String>>,
        routes: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn toast(&self, toast: &Toast) {
            self.toasts.lock().unwrap().push(toast.title.clone());
        }
        fn show_loading(&self, _title: &str) {}
        fn hide_loading(&self) {}
    }

    impl Navigator for Recorder {
        fn navigate_to(&self, route: &str) {
            self.routes.lock().unwrap().push(route.to_string());
        }
    }

    fn response(status: u16, data: Value) -> Response {
        Response {
            status,
            headers: Default::default(),
            data,
            config: RequestConfig::merge(&ClientConfig::default(), RequestOptions::new("/x")),
        }
    }

    #[tokio::test]
    async fn test_unwraps_coded_envelope() {
        let interceptor = EnvelopeInterceptor::new(Platform::default());
        let out = interceptor
            .on_response(response(200, json!({"code": 200, "data": {"id": 1}})))
            .await
            .unwrap();
        assert_eq!(out.data, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_non_200_status_is_http_error() {
        let interceptor = EnvelopeInterceptor::new(Platform::default());
        let err = interceptor
            .on_response(response(404, json!("not here")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_other_2xx_statuses_are_unwrapped() {
        let interceptor = EnvelopeInterceptor::new(Platform::default());

        let created = interceptor
            .on_response(response(201, json!({"code": 200, "data": {"id": 1}})))
            .await
            .unwrap();
        assert_eq!(created.data, json!({"id": 1}));

        let empty = interceptor.on_response(response(204, Value::Null)).await.unwrap();
        assert_eq!(empty.data, Value::Null);

        let err = interceptor
            .on_response(response(202, json!({"code": 500, "msg": "queued job rejected"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Business { code: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_navigates() {
        let recorder = Arc::new(Recorder::default());
        let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
        let platform = Platform::default()
            .with_tokens(tokens.clone())
            .with_notifier(recorder.clone())
            .with_navigator(recorder.clone());
        let interceptor = EnvelopeInterceptor::new(platform).with_login_route("/pages/login/login");

        let err = interceptor
            .on_response_error(ApiError::http(401, ""))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(tokens.token(), None);
        assert_eq!(*recorder.toasts.lock().unwrap(), vec![SESSION_EXPIRED_MESSAGE]);
        assert_eq!(*recorder.routes.lock().unwrap(), vec!["/pages/login/login"]);
    }

    #[tokio::test]
    async fn test_business_error_toasts_message() {
        let recorder = Arc::new(Recorder::default());
        let interceptor =
            EnvelopeInterceptor::new(Platform::default().with_notifier(recorder.clone()));

        interceptor
            .on_response_error(ApiError::business(Some(500), "stock exhausted"))
            .await
            .unwrap_err();
        interceptor
            .on_response_error(ApiError::business(None, "access_token missing"))
            .await
            .unwrap_err();

        assert_eq!(*recorder.toasts.lock().unwrap(), vec!["stock exhausted"]);
    }
}
