//! iweekly CLI - call the iweekly API from a terminal
//!
//! Runs the same request pipeline the mini-program uses: token injection,
//! envelope unwrapping and session handling all apply.

use clap::{Parser, Subcommand};
use iweekly_api_client::platform::{MemoryTokenStore, Platform};
use iweekly_api_client::{ApiClient, ClientConfig};
use iweekly_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

mod commands;
mod host;

use commands::{brands, get, login, user};
use host::TerminalHost;

/// Command-line client for the iweekly API
#[derive(Parser)]
#[command(name = "iweekly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// API base URL, overrides IWEEKLY_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session token for protected endpoints
    #[arg(long, global = true, env = "IWEEKLY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in milliseconds, overrides IWEEKLY_TIMEOUT_MS
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List phone brands
    Brands,

    /// Log in with username and password
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Log in with a WeChat authorization code
    WechatLogin {
        /// Code from the WeChat login flow
        #[arg(short, long)]
        code: String,
    },

    /// Show the profile of the token's user
    UserInfo,

    /// GET an arbitrary path and print the unwrapped payload
    Get {
        /// Path relative to the base URL, or an absolute URL
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        // a second init only happens in tests; logging is best-effort
        let _ = iweekly_telemetry::init_with_config(&TelemetryConfig::from_verbosity(2));
    }

    let result = match build_client(&cli) {
        Ok(client) => run(&cli, &client).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, client: &ApiClient) -> anyhow::Result<()> {
    let format = cli.format.as_str();
    match &cli.command {
        Commands::Brands => brands::run(client, format).await,
        Commands::Login { username, password } => {
            login::run_password(client, username, password, format).await
        }
        Commands::WechatLogin { code } => login::run_wechat(client, code, format).await,
        Commands::UserInfo => user::run(client, format).await,
        Commands::Get { path, query } => get::run(client, path, query, format).await,
    }
}

fn build_client(cli: &Cli) -> anyhow::Result<ApiClient> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    let tokens = match &cli.token {
        Some(token) => MemoryTokenStore::with_token(token.as_str()),
        None => MemoryTokenStore::new(),
    };
    let platform = Platform::default()
        .with_tokens(Arc::new(tokens))
        .with_notifier(Arc::new(TerminalHost::new(cli.format == "json")));

    let client = ApiClient::builder(config)
        .platform(platform)
        .with_default_middleware()
        .build()?;
    Ok(client)
}
