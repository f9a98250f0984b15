//! Accumulated list state for infinite-scroll screens

use crate::error::{ApiError, ApiResult};
use crate::helpers::call::{handle_api_response, CallOptions};
use crate::helpers::pagination::{PaginationConfig, Paginator};
use crate::platform::Notifier;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// Items fetched so far plus loading and error state
///
/// Failures are kept in [`error`](Self::error) instead of being returned;
/// the screen renders whatever state it finds.
pub struct ListManager<T, F> {
    fetch: F,
    paginator: Paginator,
    notifier: Arc<dyn Notifier>,
    show_loading: bool,
    items: Vec<T>,
    loading: bool,
    error: Option<ApiError>,
}

impl<T, F, Fut> ListManager<T, F>
where
    T: DeserializeOwned,
    F: Fn(Value) -> Fut,
    Fut: Future<Output = ApiResult<Value>>,
{
    /// Create a manager around a page fetch function
    pub fn new(fetch: F, notifier: Arc<dyn Notifier>, config: PaginationConfig) -> Self {
        Self {
            fetch,
            paginator: Paginator::new(config),
            notifier,
            show_loading: true,
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Toggle the loading indicator for first-page loads
    #[must_use]
    pub fn show_loading(mut self, show: bool) -> Self {
        self.show_loading = show;
        self
    }

    /// Reset pagination and replace the items with the first page
    pub async fn load_first_page(&mut self, params: Map<String, Value>) {
        self.loading = true;
        self.error = None;
        self.paginator.reset();

        let options = CallOptions::default().show_loading(self.show_loading);
        let fetch = &self.fetch;
        let result = handle_api_response(
            self.notifier.as_ref(),
            &options,
            self.paginator.load_data(fetch, params),
        )
        .await;

        match result {
            Ok(items) => self.items = items,
            Err(err) => self.error = Some(err),
        }
        self.loading = false;
    }

    /// Append the next page; no-op while loading or after the last page
    pub async fn load_more(&mut self, params: Map<String, Value>) {
        if self.loading || !self.paginator.state().has_more {
            return;
        }

        let options = CallOptions::default().show_loading(false);
        let fetch = &self.fetch;
        let result = handle_api_response(
            self.notifier.as_ref(),
            &options,
            self.paginator.load_data(fetch, params),
        )
        .await;

        match result {
            Ok(items) => self.items.extend(items),
            Err(err) => self.error = Some(err),
        }
    }

    /// Same as [`load_first_page`](Self::load_first_page)
    pub async fn refresh(&mut self, params: Map<String, Value>) {
        self.load_first_page(params).await;
    }

    /// Items loaded so far
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a first-page load is running
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last failure, cleared by the next first-page load
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Whether another page may exist
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.paginator.state().has_more
    }
}
