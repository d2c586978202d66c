// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET a URL and decode the body as JSON.
///
/// Any non-success status becomes [`AppError::Fetch`]; there is no retry.
pub async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: &Url) -> Result<T> {
    let response = client.get(url.as_str()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(url, status));
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
