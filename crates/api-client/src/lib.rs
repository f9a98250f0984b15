//! HTTP client for the iweekly mini-program backend
//!
//! Every call goes through one pipeline: options are merged with the client
//! configuration, request interceptors may rewrite the request, the transport
//! sends it, and response interceptors turn the reply into the payload the
//! caller asked for. Failures from any stage reach a single error handler.
//!
//! # Features
//!
//! - **Interceptor pipeline**: ordered request and response stages, each with
//!   its own error handler, plus observers for side effects such as the
//!   loading indicator
//! - **Envelope unwrapping**: `{code, data, msg}` bodies and bare payloads
//!   are reduced to the data the caller wants
//! - **Session handling**: bearer tokens on protected endpoints, token reset
//!   and login redirect on 401
//! - **Helpers**: async-call wrapper, form submission, pagination and list
//!   accumulation
//!
//! # Example
//!
//! ```rust,no_run
//! use iweekly_api_client::{ApiClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder(ClientConfig::from_env()?)
//!         .with_default_middleware()
//!         .build()?;
//!
//!     let brands = client.common().get_brands().await?;
//!     println!("Got {} brands", brands.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod helpers;
pub mod interceptor;
pub mod middleware;
pub mod platform;
pub mod request;
pub mod transport;

pub use client::{ApiClient, ClientBuilder, UploadOptions, UploadResponse};
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult};
pub use request::{RequestConfig, RequestOptions, Response};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{ApiClient, ClientBuilder};
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{CommonApi, UserApi};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::helpers::{handle_api_response, CallOptions, ListManager, Paginator};
    pub use crate::interceptor::{PipelineObserver, RequestInterceptor, ResponseInterceptor};
    pub use crate::platform::{Navigator, Notifier, Platform, TokenStore};
    pub use crate::request::{RequestOptions, Response};
}
