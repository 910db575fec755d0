// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load the configuration file strictly, apply environment overrides and
/// validate it.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating configuration {}", config_path.display());

    let config = Config::load(config_path)?.with_env_overrides();
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("✓ Config OK");
    log::info!("  API: {} (v{})", config.api.base_url, config.api.api_version);
    log::info!("  Request spacing: {} ms", config.api.min_interval_ms);
    log::info!("  Timeout: {} s", config.api.timeout_secs);
    log::info!("  Storage root: {}", config.storage.root.display());

    if config.collect.popular_sources_file.is_file() {
        log::info!(
            "  Popular sources: {}",
            config.collect.popular_sources_file.display()
        );
    } else {
        log::warn!(
            "  Popular sources file {} not found; 'popular' will fail",
            config.collect.popular_sources_file.display()
        );
    }

    Ok(config)
}
