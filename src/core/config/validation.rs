#![allow(clippy::result_large_err)]

use super::ConsoleConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &ConsoleConfig) -> Result<(), AppError> {
        let parsed = Url::parse(&config.api.base_url).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("api.base_url '{}' is not a valid URL: {}", config.api.base_url, e),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "api.base_url must use http or https",
            ));
        }

        if config.api.timeout_seconds == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "api.timeout_seconds must be greater than zero",
            ));
        }

        if !(1..=1000).contains(&config.api.page_size) {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "api.page_size must be between 1 and 1000",
            ));
        }

        Ok(())
    }
}
