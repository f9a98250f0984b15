//! Terminal rendition of toasts and the loading indicator

use indicatif::{ProgressBar, ProgressStyle};
use iweekly_api_client::platform::{Notifier, Toast, ToastKind};
use owo_colors::OwoColorize;
use std::sync::Mutex;
use std::time::Duration;

/// Prints toasts to stderr and shows a spinner while a request is in flight
pub struct TerminalHost {
    quiet: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalHost {
    /// `quiet` disables the spinner, for machine-readable output
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: Mutex::new(None),
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

impl Notifier for TerminalHost {
    fn toast(&self, toast: &Toast) {
        let line = match toast.kind {
            ToastKind::Success => format!("{} {}", "✓".green(), toast.title),
            ToastKind::Info => format!("{} {}", "!".yellow(), toast.title),
        };

        let guard = self.spinner.lock().ok();
        match guard.as_deref().and_then(Option::as_ref) {
            Some(pb) => pb.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    fn show_loading(&self, title: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(previous) = guard.replace(spinner(title)) {
                previous.finish_and_clear();
            }
        }
    }

    fn hide_loading(&self) {
        if let Some(pb) = self.spinner.lock().ok().and_then(|mut g| g.take()) {
            pb.finish_and_clear();
        }
    }
}
