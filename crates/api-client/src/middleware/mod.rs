//! Built-in interceptors and observers
//!
//! - [`AuthInterceptor`]: bearer token injection with a public-path allowlist
//! - [`EnvelopeInterceptor`]: envelope unwrapping, 401 handling, error toasts
//! - [`LoadingObserver`]: loading indicator around each dispatch
//! - [`LoggingInterceptor`]: `tracing` events for both stages
//!
//! The resilience helpers from `iweekly-core` are re-exported for convenience.

mod auth;
mod envelope;
mod loading;
mod logging;

pub use auth::AuthInterceptor;
pub use envelope::{EnvelopeInterceptor, SESSION_EXPIRED_MESSAGE};
pub use loading::{LoadingObserver, DEFAULT_LOADING_TEXT};
pub use logging::LoggingInterceptor;

// Re-export from iweekly-core for convenience
pub use iweekly_core::cache::{CacheConfig, TtlCache};
pub use iweekly_core::retry::{request_with_retry, RetryPolicy};
