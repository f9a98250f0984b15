//! Login commands

use super::{print_header, print_json};
use anyhow::Result;
use iweekly_api_client::endpoints::user::{LoginRequest, LoginResponse, WechatLoginRequest};
use iweekly_api_client::platform::TokenStore;
use iweekly_api_client::ApiClient;
use owo_colors::OwoColorize;

/// Log in with username and password
pub async fn run_password(
    client: &ApiClient,
    username: &str,
    password: &str,
    format: &str,
) -> Result<()> {
    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    let session = client.users().login(&request).await?;
    report(client, &session, format)
}

/// Log in with a WeChat authorization code
pub async fn run_wechat(client: &ApiClient, code: &str, format: &str) -> Result<()> {
    let request = WechatLoginRequest {
        code: code.to_string(),
        user_info: None,
    };
    let session = client.users().wechat_login(&request).await?;
    report(client, &session, format)
}

fn report(client: &ApiClient, session: &LoginResponse, format: &str) -> Result<()> {
    client.platform().tokens.set_token(&session.token);

    if format == "json" {
        return print_json(session);
    }

    print_header("Logged in");
    let name = session
        .user
        .as_ref()
        .and_then(|u| u.nickname.as_deref().or(u.username.as_deref()))
        .unwrap_or("unknown user");
    println!("  {} {}", "✓".green(), name.bold());
    println!("  {:<8} {}", "Token:".dimmed(), session.token);
    println!();
    println!("  {}", format!("export IWEEKLY_TOKEN={}", session.token).dimmed());

    Ok(())
}
