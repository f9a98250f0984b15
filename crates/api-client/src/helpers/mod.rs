//! Helpers built on top of the executor
//!
//! - [`handle_api_response`] / [`handle_form_submit`]: loading and error UI
//!   around a single call
//! - [`Paginator`]: page counter with a short-page end heuristic
//! - [`ListManager`]: accumulated list state over a [`Paginator`]

mod call;
mod list;
mod pagination;

pub use call::{
    handle_api_response, handle_form_submit, CallOptions, ErrorCallback, SubmitOptions,
    SuccessCallback,
};
pub use list::ListManager;
pub use pagination::{PageState, PaginationConfig, Paginator};
