//! User info command

use super::{display_value, print_header, print_json};
use anyhow::Result;
use iweekly_api_client::ApiClient;
use owo_colors::OwoColorize;

/// Show the current user's profile
pub async fn run(client: &ApiClient, format: &str) -> Result<()> {
    let user = client.users().get_user_info().await?;

    if format == "json" {
        return print_json(&user);
    }

    print_header("User");
    println!("  {:<10} {}", "ID:".dimmed(), display_value(&user.id));
    println!("  {:<10} {}", "Nickname:".dimmed(), user.nickname.as_deref().unwrap_or("-"));
    println!("  {:<10} {}", "Username:".dimmed(), user.username.as_deref().unwrap_or("-"));
    println!("  {:<10} {}", "Avatar:".dimmed(), user.avatar.as_deref().unwrap_or("-"));
    for (key, value) in &user.extra {
        println!("  {:<10} {}", format!("{key}:").dimmed(), display_value(value));
    }

    Ok(())
}
