//! Raw GET command

use anyhow::{bail, Result};
use iweekly_api_client::ApiClient;
use serde_json::{Map, Value};

/// GET `path` with optional query parameters and print the payload
pub async fn run(client: &ApiClient, path: &str, query: &[String], format: &str) -> Result<()> {
    let params = parse_query(query)?;

    let data: Value = if params.is_empty() {
        client.get(path).await?
    } else {
        client.get_with(path, &Value::Object(params)).await?
    };

    if format == "json" {
        println!("{}", serde_json::to_string(&data)?);
    } else {
        super::print_json(&data)?;
    }
    Ok(())
}

/// Parse `key=value` pairs; later duplicates win
pub fn parse_query(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid query parameter '{pair}', expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("invalid query parameter '{pair}', key is empty");
        }
        params.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(params)
}
