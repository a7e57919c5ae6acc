use datamate_console::core::config::{ConfigLoader, ConfigValidator};
use datamate_console::core::types::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_datamate_env() {
    for v in &[
        "DATAMATE_API_BASE_URL",
        "DATAMATE_API_TIMEOUT_SECONDS",
        "DATAMATE_API_PAGE_SIZE",
        "DATAMATE_CATALOG_PATH",
        "DATAMATE_FAVORITES_FILE",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_datamate_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[api]
base_url = "https://datamate.internal/api"
timeout_seconds = 12
page_size = 50

[catalog]
path = "operators.yaml"
favorites_file = "state/favorites.json"

[logging]
default_level = "debug"
"#;
    fs::write(workspace_path.join("datamate.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert_eq!(config.api.base_url, "https://datamate.internal/api");
    assert_eq!(config.api.timeout_seconds, 12);
    assert_eq!(config.api.page_size, 50);
    assert_eq!(config.catalog.path, Some(PathBuf::from("operators.yaml")));
    assert_eq!(
        config.catalog.favorites_file,
        Some(PathBuf::from("state/favorites.json"))
    );
    assert!(ConfigValidator::validate(&config).is_ok());
}

#[test]
#[serial]
fn test_env_vars_take_precedence_over_file() {
    clear_datamate_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("datamate.toml"),
        "[api]\nbase_url = \"http://file.example/api\"\npage_size = 10\n",
    )
    .unwrap();

    env::set_var("DATAMATE_API_BASE_URL", "http://env.example/api");
    env::set_var("DATAMATE_API_PAGE_SIZE", "75");
    env::set_var("DATAMATE_CATALOG_PATH", "/etc/datamate/operators.yaml");

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config.api.base_url, "http://env.example/api");
    assert_eq!(config.api.page_size, 75);
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(
        config.catalog.path,
        Some(PathBuf::from("/etc/datamate/operators.yaml"))
    );

    clear_datamate_env();
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_datamate_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8080/api");
    assert_eq!(config.api.page_size, 20);
    assert!(config.catalog.path.is_none());
}

#[test]
#[serial]
fn test_validator_rejects_out_of_range_values() {
    clear_datamate_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("datamate.toml"),
        "[api]\nbase_url = \"ftp://files.example\"\ntimeout_seconds = 0\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigError);

    env::set_var("DATAMATE_API_BASE_URL", "http://ok.example/api");
    env::set_var("DATAMATE_API_TIMEOUT_SECONDS", "5");
    env::set_var("DATAMATE_API_PAGE_SIZE", "5000");
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert!(ConfigValidator::validate(&config).is_err());

    clear_datamate_env();
}

#[test]
#[serial]
fn test_malformed_toml_is_config_error() {
    clear_datamate_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("datamate.toml"), "[api\nbase_url = ").unwrap();
    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigError);
}

#[test]
fn test_env_var_documentation_lists_every_override() {
    let docs = ConfigLoader::env_var_documentation();
    for name in [
        "DATAMATE_API_BASE_URL",
        "DATAMATE_API_TIMEOUT_SECONDS",
        "DATAMATE_API_PAGE_SIZE",
        "DATAMATE_CATALOG_PATH",
        "DATAMATE_FAVORITES_FILE",
    ] {
        assert!(docs.iter().any(|line| line.starts_with(name)), "{}", name);
    }
}
