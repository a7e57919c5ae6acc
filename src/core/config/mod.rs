use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main console configuration loaded from datamate.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsoleConfig {
    /// REST collaborator configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Operator catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// REST collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all resource paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size used by list commands
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Operator catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Optional YAML catalog replacing the built-in operator set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Favorites file (default: user config dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> u32 {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
