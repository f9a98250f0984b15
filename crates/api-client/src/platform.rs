//! Host capabilities the pipeline consumes but does not implement
//!
//! Token storage, toasts/loading indicators and navigation belong to the
//! embedding app. The defaults here keep the client usable headless: tokens
//! live in memory and notifications go to the log.

use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Key-value slot holding the pre-issued session token
pub trait TokenStore: Send + Sync {
    /// Current token, if any
    fn token(&self) -> Option<String>;

    /// Replace the token
    fn set_token(&self, token: &str);

    /// Forget the token
    fn clear_token(&self);
}

/// In-memory token slot
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: &str) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.to_string());
        }
    }

    fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

/// Toast icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Plain text, no icon
    Info,
    /// Success checkmark
    Success,
}

/// A short notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Text shown to the user
    pub title: String,
    /// Icon
    pub kind: ToastKind,
    /// Display time in milliseconds
    pub duration_ms: u64,
}

impl Toast {
    /// Plain toast shown for two seconds
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ToastKind::Info,
            duration_ms: 2000,
        }
    }

    /// Success toast shown for one and a half seconds
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ToastKind::Success,
            duration_ms: 1500,
        }
    }
}

/// UI notification primitive
pub trait Notifier: Send + Sync {
    /// Show a toast
    fn toast(&self, toast: &Toast);

    /// Show a blocking loading indicator
    fn show_loading(&self, title: &str);

    /// Hide the loading indicator
    fn hide_loading(&self);
}

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, toast: &Toast) {
        info!(title = %toast.title, kind = ?toast.kind, "toast");
    }

    fn show_loading(&self, title: &str) {
        tracing::debug!(title = %title, "loading shown");
    }

    fn hide_loading(&self) {
        tracing::debug!("loading hidden");
    }
}

/// Page navigation primitive
pub trait Navigator: Send + Sync {
    /// Open a route
    fn navigate_to(&self, route: &str);
}

/// Bundle of host capabilities handed to the client and middleware
#[derive(Clone)]
pub struct Platform {
    /// Token slot
    pub tokens: Arc<dyn TokenStore>,
    /// Toasts and loading indicator
    pub notifier: Arc<dyn Notifier>,
    /// Optional navigation
    pub navigator: Option<Arc<dyn Navigator>>,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            tokens: Arc::new(MemoryTokenStore::new()),
            notifier: Arc::new(TracingNotifier),
            navigator: None,
        }
    }
}

impl Platform {
    /// Builder-style method to set the token store
    #[must_use]
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Builder-style method to set the notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Builder-style method to set the navigator
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Navigate if a navigator is installed
    pub fn navigate(&self, route: &str) {
        match &self.navigator {
            Some(navigator) => navigator.navigate_to(route),
            None => warn!(route = %route, "No navigator installed, skipping navigation"),
        }
    }
}
