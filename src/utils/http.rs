// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::models::ApiConfig;
use crate::services::Transport;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// reqwest-backed transport issuing `GET {base_url}/{method}?{params}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        // Trailing slash so that `join` appends instead of replacing the last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(create_async_client(config)?, &config.base_url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, method: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.base_url.join(method)?;
        let text = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}
