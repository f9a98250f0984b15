//! Brands command - list phone brands

use super::{display_value, print_header, print_json};
use anyhow::Result;
use iweekly_api_client::ApiClient;
use owo_colors::OwoColorize;

/// Run brands command
pub async fn run(client: &ApiClient, format: &str) -> Result<()> {
    let brands = client.common().get_brands().await?;

    if format == "json" {
        return print_json(&brands);
    }

    print_header("Brands");
    println!("  {:<10} {:<20} {}", "ID".dimmed(), "Name".dimmed(), "Logo".dimmed());
    for brand in &brands {
        println!(
            "  {:<10} {:<20} {}",
            display_value(&brand.id),
            brand.name.bold(),
            brand.logo.as_deref().unwrap_or("-").dimmed()
        );
    }
    println!();
    println!("  Total: {} brands", brands.len());

    Ok(())
}
