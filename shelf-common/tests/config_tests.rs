//! Configuration resolution tests
//!
//! Covers the priority order (CLI > environment > TOML > default) and
//! graceful handling of missing or malformed config files.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Every test here clears the pipeline variables first.

use serial_test::serial;
use shelf_common::config::{env_keys, ConfigOverrides, PipelineConfig};
use shelf_common::Error;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    for key in env_keys::ALL {
        env::remove_var(key);
    }
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn overrides_with_file(path: PathBuf) -> ConfigOverrides {
    ConfigOverrides {
        config_file: Some(path),
        ..ConfigOverrides::default()
    }
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config =
        PipelineConfig::resolve(&overrides_with_file(dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.batch_size, 100);
    assert_eq!(config.retry_max_attempts, 3);
    assert_eq!(config.google_books_base_url, "https://www.googleapis.com/books/v1");
    assert_eq!(config.open_library_base_url, "https://openlibrary.org");
}

#[test]
#[serial]
fn test_toml_values_applied() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "batch_size = 20\nretry_max_attempts = 5\nopen_library_base_url = \"http://localhost:9000\"\n",
    );

    let config = PipelineConfig::resolve(&overrides_with_file(path)).unwrap();

    assert_eq!(config.batch_size, 20);
    assert_eq!(config.retry_max_attempts, 5);
    assert_eq!(config.open_library_base_url, "http://localhost:9000");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "batch_size = 20\n");

    env::set_var(env_keys::BATCH_SIZE, "40");
    let config = PipelineConfig::resolve(&overrides_with_file(path));
    clear_env();

    assert_eq!(config.unwrap().batch_size, 40);
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    let dir = TempDir::new().unwrap();

    env::set_var(env_keys::RETRY_MAX_ATTEMPTS, "4");
    let overrides = ConfigOverrides {
        config_file: Some(dir.path().join("absent.toml")),
        retry_max_attempts: Some(9),
        ..ConfigOverrides::default()
    };
    let config = PipelineConfig::resolve(&overrides);
    clear_env();

    assert_eq!(config.unwrap().retry_max_attempts, 9);
}

#[test]
#[serial]
fn test_config_file_from_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "http_timeout_secs = 30\n");

    env::set_var(env_keys::CONFIG_FILE, &path);
    let config = PipelineConfig::resolve(&ConfigOverrides::default());
    clear_env();

    assert_eq!(config.unwrap().http_timeout_secs, 30);
}

#[test]
#[serial]
fn test_malformed_toml_is_config_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "batch_size = \"lots\"\n");

    let result = PipelineConfig::resolve(&overrides_with_file(path));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_unparseable_env_value_is_config_error() {
    clear_env();
    let dir = TempDir::new().unwrap();

    env::set_var(env_keys::BATCH_SIZE, "many");
    let result = PipelineConfig::resolve(&overrides_with_file(dir.path().join("absent.toml")));
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_zero_batch_size_from_env_rejected() {
    clear_env();
    let dir = TempDir::new().unwrap();

    env::set_var(env_keys::BATCH_SIZE, "0");
    let result = PipelineConfig::resolve(&overrides_with_file(dir.path().join("absent.toml")));
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}
