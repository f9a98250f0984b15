//! Main API client implementation
//!
//! [`ApiClient`] is the request executor: it merges call options with the
//! stored configuration, runs the request stage, hands the result to the
//! transport and runs the response stage. Every failure passes through one
//! error handler before it reaches the caller.

use crate::config::{is_absolute, ClientConfig};
use crate::endpoints::{CommonApi, UserApi};
use crate::error::{ApiError, ApiResult};
use crate::interceptor::{
    InterceptorRegistry, PipelineObserver, RequestInterceptor, ResponseInterceptor,
};
use crate::middleware::{AuthInterceptor, EnvelopeInterceptor, LoadingObserver, LoggingInterceptor};
use crate::platform::{Platform, Toast};
use crate::request::{RequestConfig, RequestOptions, Response};
use crate::transport::{ReqwestTransport, Transport, TransportError, UploadRequest};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Pipeline stage a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Request,
    Transport,
    Response,
    Decode,
}

/// iweekly API client
///
/// Cheap to clone; clones share configuration, interceptors and transport.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: RwLock<ClientConfig>,
    interceptors: InterceptorRegistry,
    transport: Arc<dyn Transport>,
    platform: Platform,
}

/// Builder for [`ApiClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    platform: Platform,
    default_middleware: bool,
    public_paths: Option<Vec<String>>,
    login_route: Option<String>,
}

impl ClientBuilder {
    /// Start from a configuration
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            platform: Platform::default(),
            default_middleware: false,
            public_paths: None,
            login_route: None,
        }
    }

    /// Use a custom transport instead of `reqwest`
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Host capabilities
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Register logging, token injection, envelope unwrapping and the
    /// loading indicator
    #[must_use]
    pub fn with_default_middleware(mut self) -> Self {
        self.default_middleware = true;
        self
    }

    /// Paths that need no token (default middleware only)
    #[must_use]
    pub fn public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Route opened when the session expires (default middleware only)
    #[must_use]
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = Some(route.into());
        self
    }

    /// Validate the configuration and build the client
    pub fn build(self) -> ApiResult<ApiClient> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new()
                    .map_err(|e| ApiError::config(format!("cannot build HTTP client: {e}")))?,
            ),
        };

        let interceptors = InterceptorRegistry::new();
        if self.default_middleware {
            let mut auth = AuthInterceptor::new(self.platform.clone());
            if let Some(paths) = self.public_paths {
                auth = auth.with_public_paths(paths);
            }

            let mut envelope = EnvelopeInterceptor::new(self.platform.clone());
            if let Some(route) = self.login_route {
                envelope = envelope.with_login_route(route);
            }

            interceptors.add_request(Arc::new(LoggingInterceptor));
            interceptors.add_request(Arc::new(auth));
            interceptors.add_response(Arc::new(LoggingInterceptor));
            interceptors.add_response(Arc::new(envelope));
            interceptors.add_observer(Arc::new(LoadingObserver::new(
                self.platform.notifier.clone(),
            )));
        }

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: RwLock::new(self.config),
                interceptors,
                transport,
                platform: self.platform,
            }),
        })
    }
}

/// Extra options for [`ApiClient::upload`]
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Multipart field name, `file` when unset
    pub name: Option<String>,
    /// Headers that override the stored ones
    pub headers: HashMap<String, String>,
}

/// Result of a file upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Parsed response body
    pub data: Value,
    /// HTTP status code
    pub status: u16,
}

impl ApiClient {
    /// Create a client from environment configuration with the default middleware
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a client for a configuration with the default middleware
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        ClientBuilder::new(config).with_default_middleware().build()
    }

    /// Start building a client
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Snapshot of the current configuration
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> String {
        self.config().base_url
    }

    /// Host capabilities
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.inner.platform
    }

    // -------------------------------------------------------------------------
    // Config store setters (no validation, last writer wins)
    // -------------------------------------------------------------------------

    /// Replace the base URL
    pub fn set_base_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.update_config(|config| config.base_url = url);
    }

    /// Merge headers into the stored defaults
    pub fn set_headers(&self, headers: HashMap<String, String>) {
        self.update_config(|config| config.headers.extend(headers));
    }

    /// Replace the timeout
    pub fn set_timeout(&self, timeout: Duration) {
        self.update_config(|config| config.timeout = timeout);
    }

    fn update_config(&self, f: impl FnOnce(&mut ClientConfig)) {
        let mut guard = self.inner.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    // -------------------------------------------------------------------------
    // Interceptor registration
    // -------------------------------------------------------------------------

    /// Append a request-stage interceptor
    pub fn add_request_interceptor(&self, interceptor: Arc<dyn RequestInterceptor>) {
        self.inner.interceptors.add_request(interceptor);
    }

    /// Append a response-stage interceptor
    pub fn add_response_interceptor(&self, interceptor: Arc<dyn ResponseInterceptor>) {
        self.inner.interceptors.add_response(interceptor);
    }

    /// Append a dispatch observer
    pub fn add_observer(&self, observer: Arc<dyn PipelineObserver>) {
        self.inner.interceptors.add_observer(observer);
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access user endpoints
    #[must_use]
    pub fn users(&self) -> UserApi {
        UserApi::new(self.clone())
    }

    /// Access shared endpoints
    #[must_use]
    pub fn common(&self) -> CommonApi {
        CommonApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Request executor
    // -------------------------------------------------------------------------

    /// Run the full pipeline and return the final response record
    #[instrument(skip(self, options), fields(url = %options.url, request_id = tracing::field::Empty))]
    pub async fn request_raw(&self, options: RequestOptions) -> ApiResult<Response> {
        let request_id = new_request_id();
        self.execute(&request_id, options).await
    }

    /// Run the pipeline and deserialize the final `data`
    #[instrument(skip(self, options), fields(url = %options.url, request_id = tracing::field::Empty))]
    pub async fn request<T: DeserializeOwned>(&self, options: RequestOptions) -> ApiResult<T> {
        let request_id = new_request_id();
        let response = self.execute(&request_id, options).await?;
        serde_json::from_value(response.data)
            .map_err(|err| self.handle_error(&request_id, err.into(), Stage::Decode))
    }

    async fn execute(&self, request_id: &str, options: RequestOptions) -> ApiResult<Response> {
        if options.url.is_empty() {
            let err = ApiError::InvalidUrl("request url is required".to_string());
            return Err(self.handle_error(request_id, err, Stage::Request));
        }

        let merged = RequestConfig::merge(&self.config(), options);
        let config = match self.inner.interceptors.run_request(merged).await {
            Ok(config) => config,
            Err(err) => return Err(self.handle_error(request_id, err, Stage::Request)),
        };

        if !is_absolute(&config.url) {
            let err = ApiError::InvalidUrl(config.url);
            return Err(self.handle_error(request_id, err, Stage::Request));
        }

        self.inner.interceptors.notify_start(&config);
        let outcome = self.dispatch(&config).await;
        self.inner
            .interceptors
            .notify_settled(&config, outcome.as_ref().map_err(|failure| &failure.0));

        match outcome {
            Ok(response) => {
                debug!(request_id = %request_id, status = response.status, "Request succeeded");
                Ok(response)
            }
            Err((err, stage)) => Err(self.handle_error(request_id, err, stage)),
        }
    }

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.request(RequestOptions::new(url)).await
    }

    /// Perform a GET request with query parameters
    pub async fn get_with<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> ApiResult<T> {
        self.request(RequestOptions::new(url).json(params)?).await
    }

    /// Perform a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(RequestOptions::new(url).method(Method::POST).json(body)?)
            .await
    }

    /// Perform a PUT request with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(RequestOptions::new(url).method(Method::PUT).json(body)?)
            .await
    }

    /// Perform a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.request(RequestOptions::new(url).method(Method::DELETE))
            .await
    }

    /// Perform a DELETE request with query parameters
    pub async fn delete_with<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> ApiResult<T> {
        self.request(RequestOptions::new(url).method(Method::DELETE).json(params)?)
            .await
    }

    /// Upload a file as multipart form data
    ///
    /// Interceptors do not run for uploads; the stored headers and base URL
    /// still apply.
    #[instrument(skip(self, file_path, form_data, options), fields(request_id = tracing::field::Empty))]
    pub async fn upload(
        &self,
        url: &str,
        file_path: impl AsRef<Path>,
        form_data: HashMap<String, String>,
        options: UploadOptions,
    ) -> ApiResult<UploadResponse> {
        let request_id = new_request_id();

        if let Err(err) = tokio::fs::metadata(file_path.as_ref()).await {
            return Err(self.handle_error(&request_id, ApiError::Io(err), Stage::Request));
        }

        let config = self.config();
        let mut headers = config.headers.clone();
        headers.extend(options.headers);

        let request = UploadRequest {
            url: config.resolve_url(url),
            file_path: file_path.as_ref().to_path_buf(),
            name: options.name.unwrap_or_else(|| "file".to_string()),
            form_data,
            headers,
            timeout: config.timeout,
        };

        let raw = match self.inner.transport.upload(&request).await {
            Ok(raw) => raw,
            Err(err) => {
                return Err(self.handle_error(&request_id, network_error(err), Stage::Transport));
            }
        };

        let data = match raw.body {
            Value::String(text) => serde_json::from_str(&text)?,
            other => other,
        };

        Ok(UploadResponse {
            data,
            status: raw.status,
        })
    }

    async fn dispatch(&self, config: &RequestConfig) -> Result<Response, (ApiError, Stage)> {
        let raw = self
            .inner
            .transport
            .send(config)
            .await
            .map_err(|e| (network_error(e), Stage::Transport))?;

        let response = Response {
            status: raw.status,
            headers: raw.headers,
            data: raw.body,
            config: config.clone(),
        };

        self.inner
            .interceptors
            .run_response(response)
            .await
            .map_err(|e| (e, Stage::Response))
    }

    /// Log every failure; toast the ones that never reached the response stage
    fn handle_error(&self, request_id: &str, err: ApiError, stage: Stage) -> ApiError {
        error!(
            request_id = %request_id,
            stage = ?stage,
            status = ?err.status(),
            error = %err,
            "Request failed"
        );

        if matches!(stage, Stage::Request | Stage::Transport) {
            self.inner
                .platform
                .notifier
                .toast(&Toast::info(err.user_message()));
        }

        err
    }
}

/// Fresh correlation id, recorded on the current span
fn new_request_id() -> String {
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", request_id.as_str());
    request_id
}

fn network_error(err: TransportError) -> ApiError {
    if err.timeout {
        ApiError::timeout(err.message)
    } else {
        ApiError::network(err.message)
    }
}
