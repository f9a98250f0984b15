//! Page-number pagination
//!
//! The end of the list is detected heuristically: a page with fewer items
//! than `page_size` is the last one. A server that returns exactly a full
//! last page costs one extra, empty fetch.

use crate::error::ApiResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use tracing::{debug, error};

/// Paginator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Items requested per page
    pub page_size: usize,
    /// Number of the first page
    pub initial_page: u32,
    /// Key holding the items when the server wraps them in an object
    pub data_key: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            initial_page: 1,
            data_key: "list".to_string(),
        }
    }
}

/// Snapshot of paginator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// Next page to fetch
    pub current_page: u32,
    /// Whether another fetch may return items
    pub has_more: bool,
    /// Whether a fetch is in flight
    pub loading: bool,
}

/// Page counter over an arbitrary fetch function
#[derive(Debug, Clone)]
pub struct Paginator {
    config: PaginationConfig,
    state: PageState,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PaginationConfig::default())
    }
}

impl Paginator {
    /// Create a paginator at its initial page
    #[must_use]
    pub fn new(config: PaginationConfig) -> Self {
        let state = PageState {
            current_page: config.initial_page,
            has_more: true,
            loading: false,
        };
        Self { config, state }
    }

    /// Back to the initial page
    pub fn reset(&mut self) {
        self.state = PageState {
            current_page: self.config.initial_page,
            has_more: true,
            loading: false,
        };
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    /// Settings
    #[must_use]
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch the next page
    ///
    /// `fetch` receives `params` plus `page` and `pageSize`. It is not called
    /// at all once the last page was seen; the result is then empty.
    pub async fn load_data<T, F, Fut>(
        &mut self,
        fetch: F,
        params: Map<String, Value>,
    ) -> ApiResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = ApiResult<Value>>,
    {
        if self.state.loading || !self.state.has_more {
            return Ok(Vec::new());
        }

        let mut query = params;
        query.insert("page".to_string(), Value::from(self.state.current_page));
        query.insert("pageSize".to_string(), Value::from(self.config.page_size));

        self.state.loading = true;
        let result = fetch(Value::Object(query)).await;
        self.state.loading = false;

        let items: Vec<T> = match result.and_then(|page| self.extract(page)) {
            Ok(items) => items,
            Err(err) => {
                error!(page = self.state.current_page, error = %err, "Page load failed");
                return Err(err);
            }
        };

        self.state.has_more = items.len() >= self.config.page_size;
        self.state.current_page += 1;
        debug!(
            page = self.state.current_page - 1,
            items = items.len(),
            has_more = self.state.has_more,
            "Page loaded"
        );

        Ok(items)
    }

    fn extract<T: DeserializeOwned>(&self, page: Value) -> ApiResult<Vec<T>> {
        let items = match page {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove(&self.config.data_key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(serde_json::from_value(Value::Array(items))?)
    }
}
