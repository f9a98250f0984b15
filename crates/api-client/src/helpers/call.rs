//! Loading/error side effects around a single API call

use crate::error::{ApiError, ApiResult};
use crate::middleware::DEFAULT_LOADING_TEXT;
use crate::platform::{Notifier, Toast};
use std::future::Future;
use std::sync::Arc;
use tracing::error;

/// Error callback
pub type ErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// Success callback; the value itself is returned to the caller
pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;

/// Options for [`handle_api_response`]
#[derive(Clone)]
pub struct CallOptions {
    /// Show a loading indicator while the call runs
    pub show_loading: bool,
    /// Toast the error message on failure
    pub show_error: bool,
    /// Loading indicator text
    pub loading_text: String,
    /// Invoked after a successful call
    pub on_success: Option<SuccessCallback>,
    /// Invoked with the error before it is returned
    pub on_error: Option<ErrorCallback>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            show_loading: true,
            show_error: true,
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            on_success: None,
            on_error: None,
        }
    }
}

impl CallOptions {
    /// Builder-style method to toggle the loading indicator
    #[must_use]
    pub fn show_loading(mut self, show: bool) -> Self {
        self.show_loading = show;
        self
    }

    /// Builder-style method to toggle the error toast
    #[must_use]
    pub fn show_error(mut self, show: bool) -> Self {
        self.show_error = show;
        self
    }

    /// Builder-style method to set the loading text
    #[must_use]
    pub fn loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Builder-style method to set the success callback
    #[must_use]
    pub fn on_success(mut self, callback: SuccessCallback) -> Self {
        self.on_success = Some(callback);
        self
    }

    /// Builder-style method to set the error callback
    #[must_use]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }
}

/// Await an API call with a loading indicator and an error toast
///
/// The error is always returned to the caller after the side effects ran.
pub async fn handle_api_response<T, Fut>(
    notifier: &dyn Notifier,
    options: &CallOptions,
    call: Fut,
) -> ApiResult<T>
where
    Fut: Future<Output = ApiResult<T>>,
{
    if options.show_loading {
        notifier.show_loading(&options.loading_text);
    }

    let result = call.await;

    if options.show_loading {
        notifier.hide_loading();
    }

    match &result {
        Ok(_) => {
            if let Some(callback) = &options.on_success {
                callback();
            }
        }
        Err(err) => {
            error!(error = %err, "API call failed");

            let message = err.message();
            if options.show_error && !message.is_empty() {
                notifier.toast(&Toast::info(message));
            }

            if let Some(callback) = &options.on_error {
                callback(err);
            }
        }
    }

    result
}

/// Options for [`handle_form_submit`]
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Show a loading indicator while submitting
    pub show_loading: bool,
    /// Toast on success
    pub show_success: bool,
    /// Success toast text
    pub success_message: String,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            show_loading: true,
            show_success: true,
            success_message: "Submitted successfully".to_string(),
        }
    }
}

/// Submit a form through `submit`, with a "submitting" indicator and a
/// success toast
pub async fn handle_form_submit<T, F, Fut, Form>(
    notifier: &dyn Notifier,
    options: &SubmitOptions,
    submit: F,
    form: Form,
) -> ApiResult<T>
where
    F: FnOnce(Form) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let call_options = CallOptions::default()
        .show_loading(options.show_loading)
        .loading_text("Submitting...");

    let value = handle_api_response(notifier, &call_options, submit(form)).await?;

    if options.show_success {
        notifier.toast(&Toast::success(options.success_message.clone()));
    }

    Ok(value)
}
