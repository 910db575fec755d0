//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `api.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API and HTTP behavior settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Collection defaults
    #[serde(default)]
    pub collect: CollectConfig,

    /// Where sessions are saved
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.api.access_token = token;
            }
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)?;
        if self.api.access_token.trim().is_empty() {
            return Err(AppError::validation(format!(
                "api.access_token is empty (set it in the config or {ACCESS_TOKEN_ENV})"
            )));
        }
        if self.api.api_version.trim().is_empty() {
            return Err(AppError::validation("api.api_version is empty"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.storage.posts_dir == self.storage.texts_dir {
            return Err(AppError::validation(
                "storage.posts_dir and storage.texts_dir must differ",
            ));
        }
        Ok(())
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every method name is appended to
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default)]
    pub access_token: String,

    #[serde(default = "defaults::api_version")]
    pub api_version: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum spacing enforced after each request, in milliseconds
    #[serde(default = "defaults::min_interval")]
    pub min_interval_ms: u64,
}

impl ApiConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            access_token: String::new(),
            api_version: defaults::api_version(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            min_interval_ms: defaults::min_interval(),
        }
    }
}

/// Collection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Drop posts and comments without text
    #[serde(default = "defaults::skip_blank")]
    pub skip_blank: bool,

    /// File listing owner ids of popular communities, one per line
    #[serde(default = "defaults::popular_sources_file")]
    pub popular_sources_file: PathBuf,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            skip_blank: defaults::skip_blank(),
            popular_sources_file: defaults::popular_sources_file(),
        }
    }
}

/// Storage layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::storage_root")]
    pub root: PathBuf,

    /// Sessions of collected posts, relative to `root`
    #[serde(default = "defaults::posts_dir")]
    pub posts_dir: String,

    /// Sessions of uploaded plain texts, relative to `root`
    #[serde(default = "defaults::texts_dir")]
    pub texts_dir: String,

    /// Labelled training examples, relative to `root`
    #[serde(default = "defaults::examples_file")]
    pub examples_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: defaults::storage_root(),
            posts_dir: defaults::posts_dir(),
            texts_dir: defaults::texts_dir(),
            examples_file: defaults::examples_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // API defaults
    pub fn base_url() -> String {
        "https://api.vk.com/method".into()
    }
    pub fn api_version() -> String {
        "5.199".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; opinion-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn min_interval() -> u64 {
        200
    }

    // Collect defaults
    pub fn skip_blank() -> bool {
        true
    }
    pub fn popular_sources_file() -> PathBuf {
        PathBuf::from("API/VK/PopularGroups.txt")
    }

    // Storage defaults
    pub fn storage_root() -> PathBuf {
        PathBuf::from("Texts")
    }
    pub fn posts_dir() -> String {
        "Parsed Posts".into()
    }
    pub fn texts_dir() -> String {
        "Uploaded Texts".into()
    }
    pub fn examples_file() -> PathBuf {
        PathBuf::from("ML Examples/Examples.txt")
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.api.access_token = "token".to_string();
        config
    }

    #[test]
    fn validate_default_config_with_token_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_token() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = valid_config();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_shared_session_roots() {
        let mut config = valid_config();
        config.storage.texts_dir = config.storage.posts_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            access_token = "abc"
            min_interval_ms = 50

            [storage]
            root = "/tmp/texts"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.access_token, "abc");
        assert_eq!(config.api.min_interval(), Duration::from_millis(50));
        assert_eq!(config.api.api_version, "5.199");
        assert_eq!(config.storage.root, PathBuf::from("/tmp/texts"));
        assert_eq!(config.storage.posts_dir, "Parsed Posts");
        assert!(config.collect.skip_blank);
    }
}
