//! Shared async building blocks for iweekly tools
//!
//! - **Retry**: fixed-count retry with linearly growing delay
//! - **Cache**: in-memory TTL cache for async lookups
//!
//! Both are independent of HTTP; the API client re-exports them for callers
//! that wrap endpoint calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use iweekly_core::prelude::*;
//!
//! # async fn run() -> Result<(), String> {
//! let cache: TtlCache<String> = TtlCache::new(CacheConfig::default());
//! let value = cache
//!     .get_with("greeting", None, || async {
//!         request_with_retry(&RetryPolicy::default(), |_| async {
//!             Ok::<_, String>("hello".to_string())
//!         })
//!         .await
//!     })
//!     .await?;
//! assert_eq!(value, "hello");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod retry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, TtlCache};
    pub use crate::retry::{request_with_retry, RetryPolicy};
}
