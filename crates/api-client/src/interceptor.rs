//! Interceptor registry
//!
//! Two ordered stages, request and response. Each interceptor is a pair of
//! handlers: the fulfilled handler transforms the value flowing through the
//! stage, and the rejected handler runs when its own fulfilled handler fails.
//! Whatever the rejected handler returns ends the stage, so it can either
//! recover with a value or re-raise. The default rejected handler re-raises.
//!
//! Interceptors run strictly in registration order, one at a time; the
//! output of one is the input of the next. There is no removal API.
//!
//! Side effects that never change the value (loading indicators) are
//! [`PipelineObserver`]s instead.

use crate::error::{ApiError, ApiResult};
use crate::request::{RequestConfig, Response};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Request-stage interceptor
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Transform the outgoing configuration
    async fn on_request(&self, config: RequestConfig) -> ApiResult<RequestConfig> {
        Ok(config)
    }

    /// Handle a failure raised by [`on_request`](Self::on_request)
    async fn on_request_error(&self, error: ApiError) -> ApiResult<RequestConfig> {
        Err(error)
    }
}

/// Response-stage interceptor
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Transform the incoming response
    async fn on_response(&self, response: Response) -> ApiResult<Response> {
        Ok(response)
    }

    /// Handle a failure raised by [`on_response`](Self::on_response)
    async fn on_response_error(&self, error: ApiError) -> ApiResult<Response> {
        Err(error)
    }
}

/// Side-effect hooks around a dispatch
///
/// `on_start` runs after the request stage, right before the transport;
/// `on_settled` runs exactly once afterwards, whatever the outcome.
pub trait PipelineObserver: Send + Sync {
    /// The request is about to be sent
    fn on_start(&self, _config: &RequestConfig) {}

    /// The request finished, successfully or not
    fn on_settled(&self, _config: &RequestConfig, _outcome: Result<&Response, &ApiError>) {}
}

/// Request interceptor built from a plain function
pub struct RequestFn<F>(F);

/// Wrap a function as a request interceptor
pub fn request_fn<F>(f: F) -> RequestFn<F>
where
    F: Fn(RequestConfig) -> ApiResult<RequestConfig> + Send + Sync,
{
    RequestFn(f)
}

#[async_trait]
impl<F> RequestInterceptor for RequestFn<F>
where
    F: Fn(RequestConfig) -> ApiResult<RequestConfig> + Send + Sync,
{
    async fn on_request(&self, config: RequestConfig) -> ApiResult<RequestConfig> {
        (self.0)(config)
    }
}

/// Response interceptor built from a plain function
pub struct ResponseFn<F>(F);

/// Wrap a function as a response interceptor
pub fn response_fn<F>(f: F) -> ResponseFn<F>
where
    F: Fn(Response) -> ApiResult<Response> + Send + Sync,
{
    ResponseFn(f)
}

#[async_trait]
impl<F> ResponseInterceptor for ResponseFn<F>
where
    F: Fn(Response) -> ApiResult<Response> + Send + Sync,
{
    async fn on_response(&self, response: Response) -> ApiResult<Response> {
        (self.0)(response)
    }
}

/// Ordered interceptor and observer lists
#[derive(Default)]
pub struct InterceptorRegistry {
    request: RwLock<Vec<Arc<dyn RequestInterceptor>>>,
    response: RwLock<Vec<Arc<dyn ResponseInterceptor>>>,
    observers: RwLock<Vec<Arc<dyn PipelineObserver>>>,
}

impl InterceptorRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request interceptor
    pub fn add_request(&self, interceptor: Arc<dyn RequestInterceptor>) {
        write(&self.request).push(interceptor);
    }

    /// Append a response interceptor
    pub fn add_response(&self, interceptor: Arc<dyn ResponseInterceptor>) {
        write(&self.response).push(interceptor);
    }

    /// Append an observer
    pub fn add_observer(&self, observer: Arc<dyn PipelineObserver>) {
        write(&self.observers).push(observer);
    }

    /// Number of registered (request, response) interceptors
    #[must_use]
    pub fn len(&self) -> (usize, usize) {
        (snapshot(&self.request).len(), snapshot(&self.response).len())
    }

    /// Whether both stages are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }

    /// Thread a configuration through the request stage
    pub async fn run_request(&self, config: RequestConfig) -> ApiResult<RequestConfig> {
        let mut current = config;
        for interceptor in snapshot(&self.request) {
            match interceptor.on_request(current).await {
                Ok(next) => current = next,
                Err(error) => return interceptor.on_request_error(error).await,
            }
        }
        Ok(current)
    }

    /// Thread a response through the response stage
    pub async fn run_response(&self, response: Response) -> ApiResult<Response> {
        let mut current = response;
        for interceptor in snapshot(&self.response) {
            match interceptor.on_response(current).await {
                Ok(next) => current = next,
                Err(error) => return interceptor.on_response_error(error).await,
            }
        }
        Ok(current)
    }

    pub(crate) fn notify_start(&self, config: &RequestConfig) {
        for observer in snapshot(&self.observers) {
            observer.on_start(config);
        }
    }

    pub(crate) fn notify_settled(&self, config: &RequestConfig, outcome: Result<&Response, &ApiError>) {
        for observer in snapshot(&self.observers) {
            observer.on_settled(config, outcome);
        }
    }
}

/// Clone the list so no lock is held across an await
fn snapshot<T: ?Sized>(list: &RwLock<Vec<Arc<T>>>) -> Vec<Arc<T>> {
    list.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn write<T: ?Sized>(list: &RwLock<Vec<Arc<T>>>) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<T>>> {
    list.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::request::RequestOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> RequestConfig {
        RequestConfig::merge(&ClientConfig::default(), RequestOptions::new("/x"))
    }

    fn tag(name: &'static str) -> Arc<dyn RequestInterceptor> {
        Arc::new(request_fn(move |mut cfg: RequestConfig| {
            let trail = cfg.headers.remove("X-Trail").unwrap_or_default();
            cfg.headers.insert("X-Trail".into(), format!("{trail}{name}"));
            Ok(cfg)
        }))
    }

    struct Recovering {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestInterceptor for Recovering {
        async fn on_request(&self, _config: RequestConfig) -> ApiResult<RequestConfig> {
            Err(ApiError::config("boom"))
        }

        async fn on_request_error(&self, _error: ApiError) -> ApiResult<RequestConfig> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut cfg = config();
            cfg.headers.insert("X-Recovered".into(), "yes".into());
            Ok(cfg)
        }
    }

    #[tokio::test]
    async fn test_request_chain_runs_in_registration_order() {
        let registry = InterceptorRegistry::new();
        registry.add_request(tag("a"));
        registry.add_request(tag("b"));
        registry.add_request(tag("c"));

        let out = registry.run_request(config()).await.unwrap();
        assert_eq!(out.header("X-Trail"), Some("abc"));
        assert_eq!(registry.len(), (3, 0));
    }

    #[tokio::test]
    async fn test_failure_without_handler_propagates() {
        let registry = InterceptorRegistry::new();
        registry.add_request(tag("a"));
        registry.add_request(Arc::new(request_fn(|_| Err(ApiError::config("denied")))));
        registry.add_request(tag("never"));

        let err = registry.run_request(config()).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(ref m) if m == "denied"));
    }

    #[tokio::test]
    async fn test_rejection_handler_result_ends_the_stage() {
        let registry = InterceptorRegistry::new();
        let recovering = Arc::new(Recovering {
            calls: AtomicUsize::new(0),
        });
        registry.add_request(recovering.clone());
        registry.add_request(tag("skipped"));

        let out = registry.run_request(config()).await.unwrap();
        assert_eq!(out.header("X-Recovered"), Some("yes"));
        assert_eq!(out.header("X-Trail"), None);
        assert_eq!(recovering.calls.load(Ordering::SeqCst), 1);
    }

    fn response() -> Response {
        Response {
            status: 200,
            headers: Default::default(),
            data: serde_json::json!(1),
            config: config(),
        }
    }

    struct FallbackPayload;

    #[async_trait]
    impl ResponseInterceptor for FallbackPayload {
        async fn on_response(&self, _response: Response) -> ApiResult<Response> {
            Err(ApiError::business(Some(500), "upstream down"))
        }

        async fn on_response_error(&self, error: ApiError) -> ApiResult<Response> {
            let mut fallback = response();
            fallback.data = serde_json::json!({"fallback": error.message()});
            Ok(fallback)
        }
    }

    #[tokio::test]
    async fn test_response_rejection_handler_recovers_and_ends_the_stage() {
        let registry = InterceptorRegistry::new();
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = later_calls.clone();
        registry.add_response(Arc::new(FallbackPayload));
        registry.add_response(Arc::new(response_fn(move |r: Response| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(r)
        })));

        let out = registry.run_response(response()).await.unwrap();
        assert_eq!(out.data, serde_json::json!({"fallback": "upstream down"}));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_response_failure_skips_later_interceptors() {
        let registry = InterceptorRegistry::new();
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = later_calls.clone();
        registry.add_response(Arc::new(response_fn(|_| Err(ApiError::http(502, "bad gateway")))));
        registry.add_response(Arc::new(response_fn(move |r: Response| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(r)
        })));

        let err = registry.run_response(response()).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_response_chain_transforms_data() {
        let registry = InterceptorRegistry::new();
        registry.add_response(Arc::new(response_fn(|mut r: Response| {
            r.data = serde_json::json!({"wrapped": r.data});
            Ok(r)
        })));

        let out = registry.run_response(response()).await.unwrap();
        assert_eq!(out.data, serde_json::json!({"wrapped": 1}));
    }
}
