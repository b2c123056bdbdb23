// src/extract/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

pub mod countries;
pub mod happiness;

/// Fetch a page body as text, treating any non-success status as an error.
async fn get_text(client: &Client, url_str: &str) -> Result<String> {
    let url = Url::parse(url_str)?;
    debug!("Fetching text from {}", url);
    Ok(client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))?)
}
