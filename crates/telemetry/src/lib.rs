//! Logging setup for iweekly tools
//!
//! Installs a global `tracing` subscriber that writes to stderr, so command
//! output on stdout stays machine-readable. Every process gets a session id
//! that is logged once at startup for correlating runs.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging with the default configuration
pub fn init() -> anyhow::Result<()> {
    init_with_config(&TelemetryConfig::default())
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `config.log_level`. Fails if a global
/// subscriber is already installed.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_line_number)
                    .compact(),
            ),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.show_target)
                    .with_file(config.show_file)
                    .with_line_number(config.show_line_number)
                    .json(),
            ),
        ),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: LogFormat::Compact,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Configuration for a `-v` count: 0 warn, 1 info+targets, 2 debug, 3+ trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let log_level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            log_level: log_level.to_string(),
            show_target: verbosity > 0,
            ..Self::default()
        }
    }

    /// Switch to JSON lines
    #[must_use]
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }
}
