//! Loading indicator around each dispatch

use crate::error::ApiError;
use crate::interceptor::PipelineObserver;
use crate::platform::Notifier;
use crate::request::{RequestConfig, Response};
use std::sync::Arc;

/// Default indicator text
pub const DEFAULT_LOADING_TEXT: &str = "Loading...";

/// Shows the loading indicator when a request leaves and hides it once the
/// request settles
pub struct LoadingObserver {
    notifier: Arc<dyn Notifier>,
    title: String,
}

impl LoadingObserver {
    /// Observer with the default text
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            title: DEFAULT_LOADING_TEXT.to_string(),
        }
    }

    /// Change the indicator text
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl PipelineObserver for LoadingObserver {
    fn on_start(&self, _config: &RequestConfig) {
        self.notifier.show_loading(&self.title);
    }

    fn on_settled(&self, _config: &RequestConfig, _outcome: Result<&Response, &ApiError>) {
        self.notifier.hide_loading();
    }
}
