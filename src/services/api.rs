// src/services/api.rs

//! VK API client.
//!
//! One method per upstream call. Each call validates its `count` bound,
//! issues exactly one request and then holds the caller until at least
//! `min_interval` has passed since the request started.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::ApiConfig;
use crate::utils::http::HttpTransport;

/// Page size limit of `wall.get`.
pub const MAX_POSTS_PER_REQUEST: u32 = 100;
/// Page size limit of `newsfeed.search`.
pub const MAX_NEWSFEED_POSTS_PER_REQUEST: u32 = 200;
/// Page size limit of `newsfeed.search` with a time range.
pub const MAX_RANGED_NEWSFEED_POSTS_PER_REQUEST: u32 = 100;
/// Page size limit of `wall.getComments`.
pub const MAX_COMMENTS_PER_REQUEST: u32 = 100;
/// Most results `newsfeed.search` ever returns for one query.
pub const SEARCH_RESULT_CAP: usize = 1000;
/// Fields requested from `users.get` for enrichment.
pub const USER_FIELDS: &str = "bdate,sex";

/// Wire access for the API client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Call `method` with query `params` and return the raw response body.
    async fn get(&self, method: &str, params: &[(&str, String)]) -> Result<String>;
}

/// Client for the VK API methods used by the collector.
pub struct VkApiClient<T: Transport = HttpTransport> {
    transport: T,
    access_token: String,
    api_version: String,
    min_interval: Duration,
    /// Start of the most recent request.
    last_request: Mutex<Option<Instant>>,
}

impl VkApiClient<HttpTransport> {
    /// Create a client talking HTTP to the configured base URL.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::from_config(config)?, config))
    }
}

impl<T: Transport> VkApiClient<T> {
    pub fn with_transport(transport: T, config: &ApiConfig) -> Self {
        Self {
            transport,
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
            min_interval: config.min_interval(),
            last_request: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `wall.get`: posts from a user or community wall.
    pub async fn wall_get(&self, owner_id: &str, offset: u32, count: u32) -> Result<String> {
        check_count("count", count, MAX_POSTS_PER_REQUEST)?;
        let params = vec![
            ("owner_id", owner_id.to_string()),
            ("offset", offset.to_string()),
            ("count", count.to_string()),
        ];
        self.call_paced("wall.get", params).await
    }

    /// `wall.getComments`: comments under one wall post.
    pub async fn wall_get_comments(
        &self,
        owner_id: &str,
        post_id: &str,
        offset: u32,
        count: u32,
    ) -> Result<String> {
        check_count("count", count, MAX_COMMENTS_PER_REQUEST)?;
        let params = vec![
            ("owner_id", owner_id.to_string()),
            ("post_id", post_id.to_string()),
            ("offset", offset.to_string()),
            ("count", count.to_string()),
        ];
        self.call_paced("wall.getComments", params).await
    }

    /// `newsfeed.search`: posts matching a query.
    pub async fn newsfeed_search(
        &self,
        query: &str,
        count: u32,
        start_from: Option<&str>,
    ) -> Result<String> {
        check_count("count", count, MAX_NEWSFEED_POSTS_PER_REQUEST)?;
        let mut params = vec![("q", query.to_string()), ("count", count.to_string())];
        if let Some(start_from) = start_from {
            params.push(("start_from", start_from.to_string()));
        }
        self.call_paced("newsfeed.search", params).await
    }

    /// `newsfeed.search` restricted to `[start, end]`.
    ///
    /// Unlike the other methods this one returns without the post-call wait.
    pub async fn newsfeed_search_in_range(
        &self,
        query: &str,
        count: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        start_from: Option<&str>,
    ) -> Result<String> {
        check_count("count", count, MAX_RANGED_NEWSFEED_POSTS_PER_REQUEST)?;
        let mut params = vec![("q", query.to_string()), ("count", count.to_string())];
        if let Some(start_from) = start_from {
            params.push(("start_from", start_from.to_string()));
        }
        params.push(("start_time", start.timestamp().to_string()));
        params.push(("end_time", end.timestamp().to_string()));
        self.call("newsfeed.search", params).await
    }

    /// `users.get` for a comma separated id list.
    pub async fn users_get(&self, user_ids: &[&str], fields: &str) -> Result<String> {
        let params = vec![
            ("user_ids", user_ids.join(",")),
            ("fields", fields.to_string()),
        ];
        self.call_paced("users.get", params).await
    }

    /// Issue one request and hold the caller for the rest of `min_interval`.
    async fn call_paced(&self, method: &str, params: Vec<(&str, String)>) -> Result<String> {
        let body = self.call(method, params).await?;
        self.pace().await;
        Ok(body)
    }

    async fn call(&self, method: &str, mut params: Vec<(&str, String)>) -> Result<String> {
        params.push(("access_token", self.access_token.clone()));
        params.push(("v", self.api_version.clone()));

        self.mark_request_start();
        log::debug!("Calling {}", method);
        self.transport.get(method, &params).await
    }

    fn mark_request_start(&self) {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(Instant::now());
        }
    }

    async fn pace(&self) {
        let elapsed = match self.last_request.lock() {
            Ok(last) => last.map(|started| started.elapsed()),
            Err(_) => None,
        };
        if let Some(remaining) = elapsed.and_then(|e| self.min_interval.checked_sub(e)) {
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
        }
    }
}

fn check_count(name: &str, count: u32, max: u32) -> Result<()> {
    if count < 1 || count > max {
        return Err(AppError::invalid_argument(format!(
            "{name} must be within 1..={max}, got {count}"
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    fn config(min_interval_ms: u64) -> ApiConfig {
        ApiConfig {
            access_token: "secret".to_string(),
            min_interval_ms,
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_count_bounds_checked_before_call() {
        let client = VkApiClient::with_transport(ScriptedTransport::new(), &config(0));

        for result in [
            client.wall_get("1", 0, 0).await,
            client.wall_get("1", 0, 101).await,
            client.wall_get_comments("1", "2", 0, 101).await,
            client.newsfeed_search("q", 201, None).await,
            client
                .newsfeed_search_in_range("q", 101, Utc::now(), Utc::now(), None)
                .await,
        ] {
            assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        }
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_upper_bounds_are_inclusive() {
        let transport = ScriptedTransport::new()
            .reply("wall.get", "{}")
            .reply("newsfeed.search", "{}");
        let client = VkApiClient::with_transport(transport, &config(0));

        assert!(client.wall_get("1", 0, 100).await.is_ok());
        assert!(client.newsfeed_search("q", 200, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_credentials_and_params_are_sent() {
        let transport = ScriptedTransport::new().reply("wall.getComments", "{}");
        let client = VkApiClient::with_transport(transport, &config(0));

        client.wall_get_comments("-5", "42", 100, 100).await.unwrap();

        let call = &client.transport().calls()[0];
        assert_eq!(call.method, "wall.getComments");
        assert_eq!(call.param("owner_id"), Some("-5"));
        assert_eq!(call.param("post_id"), Some("42"));
        assert_eq!(call.param("offset"), Some("100"));
        assert_eq!(call.param("access_token"), Some("secret"));
        assert_eq!(call.param("v"), Some("5.199"));
    }

    #[tokio::test]
    async fn test_search_cursor_and_time_range() {
        let transport = ScriptedTransport::new()
            .reply("newsfeed.search", "{}")
            .reply("newsfeed.search", "{}");
        let client = VkApiClient::with_transport(transport, &config(0));
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let end = DateTime::from_timestamp(1_700_086_400, 0).unwrap();

        client.newsfeed_search("news", 200, None).await.unwrap();
        client
            .newsfeed_search_in_range("news", 100, start, end, Some("7/-1_2"))
            .await
            .unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls[0].param("start_from"), None);
        assert_eq!(calls[1].param("start_from"), Some("7/-1_2"));
        assert_eq!(calls[1].param("start_time"), Some("1700000000"));
        assert_eq!(calls[1].param("end_time"), Some("1700086400"));
    }

    #[tokio::test]
    async fn test_users_get_joins_ids() {
        let transport = ScriptedTransport::new().reply("users.get", "{}");
        let client = VkApiClient::with_transport(transport, &config(0));

        client.users_get(&["1", "2", "3"], USER_FIELDS).await.unwrap();

        let call = &client.transport().calls()[0];
        assert_eq!(call.param("user_ids"), Some("1,2,3"));
        assert_eq!(call.param("fields"), Some("bdate,sex"));
    }

    #[tokio::test]
    async fn test_consecutive_calls_are_spaced() {
        let transport = ScriptedTransport::new()
            .reply("wall.get", "{}")
            .reply("wall.get", "{}");
        let client = VkApiClient::with_transport(transport, &config(200));

        client.wall_get("1", 0, 100).await.unwrap();
        client.wall_get("1", 100, 100).await.unwrap();

        let calls = client.transport().calls();
        let gap = calls[1].at.duration_since(calls[0].at);
        assert!(gap >= Duration::from_millis(200), "gap was {gap:?}");
    }

    #[tokio::test]
    async fn test_ranged_search_returns_without_waiting() {
        let transport = ScriptedTransport::new().reply("newsfeed.search", "{}");
        let client = VkApiClient::with_transport(transport, &config(1_000));

        let started = Instant::now();
        client
            .newsfeed_search_in_range("q", 10, Utc::now(), Utc::now(), None)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = VkApiClient::with_transport(ScriptedTransport::new(), &config(0));
        let err = client.users_get(&["1"], USER_FIELDS).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }
}
