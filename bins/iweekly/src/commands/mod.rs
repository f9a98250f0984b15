//! CLI command implementations

pub mod brands;
pub mod get;
pub mod login;
pub mod user;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

const RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a boxed section title
pub fn print_header(title: &str) {
    println!();
    println!("{}", RULE.blue());
    println!("  {}", title.blue().bold());
    println!("{}", RULE.blue());
    println!();
}

/// Render a JSON scalar without string quotes
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
