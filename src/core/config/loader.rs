#![allow(clippy::result_large_err)]

use super::ConsoleConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

/// File name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "datamate.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/datamate.toml)
    /// Environment variables override config file values
    pub fn load_from_workspace(workspace_path: &Path) -> Result<ConsoleConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        Self::load_with_overrides(&config_path)
    }

    /// Load config from an explicit file, falling back to defaults when the file
    /// is absent, then apply environment overrides.
    pub fn load_with_overrides(config_path: &Path) -> Result<ConsoleConfig, AppError> {
        let mut config = Self::load_from_file(config_path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ConsoleConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: ConsoleConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        tracing::debug!(path = %path.display(), "loaded console config");
        Ok(Some(config))
    }

    fn apply_env_overrides(config: &mut ConsoleConfig) {
        if let Ok(base_url) = env::var("DATAMATE_API_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(timeout_str) = env::var("DATAMATE_API_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.api.timeout_seconds = timeout;
            }
        }

        if let Ok(page_size_str) = env::var("DATAMATE_API_PAGE_SIZE") {
            if let Ok(page_size) = page_size_str.parse::<u32>() {
                config.api.page_size = page_size;
            }
        }

        if let Ok(catalog_path) = env::var("DATAMATE_CATALOG_PATH") {
            config.catalog.path = Some(PathBuf::from(catalog_path));
        }

        if let Ok(favorites_file) = env::var("DATAMATE_FAVORITES_FILE") {
            config.catalog.favorites_file = Some(PathBuf::from(favorites_file));
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "DATAMATE_API_BASE_URL - Override the REST API base URL (default: http://localhost:8080/api)",
            "DATAMATE_API_TIMEOUT_SECONDS - Override the per-request timeout (default: 30)",
            "DATAMATE_API_PAGE_SIZE - Override the list page size (default: 20)",
            "DATAMATE_CATALOG_PATH - Load the operator catalog from this YAML file",
            "DATAMATE_FAVORITES_FILE - Override the favorites file location",
        ]
    }
}
