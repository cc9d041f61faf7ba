//! Pipeline configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line override (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`PipelineConfig`] is immutable and built once at startup.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 2;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable names
pub mod env_keys {
    pub const CONFIG_FILE: &str = "SHELF_CONFIG";
    pub const DATABASE_PATH: &str = "SHELF_DATABASE_PATH";
    pub const GOOGLE_BOOKS_BASE_URL: &str = "GOOGLE_BOOKS_BASE_URL";
    pub const OPEN_LIBRARY_BASE_URL: &str = "OPEN_LIBRARY_BASE_URL";
    pub const BATCH_SIZE: &str = "BATCH_SIZE";
    pub const RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
    pub const REQUESTS_PER_SECOND: &str = "REQUESTS_PER_SECOND";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";

    /// Every key read by [`super::PipelineConfig::resolve`]
    pub const ALL: [&str; 9] = [
        CONFIG_FILE,
        DATABASE_PATH,
        GOOGLE_BOOKS_BASE_URL,
        OPEN_LIBRARY_BASE_URL,
        BATCH_SIZE,
        RETRY_MAX_ATTEMPTS,
        HTTP_TIMEOUT_SECS,
        REQUESTS_PER_SECOND,
        LOG_LEVEL,
    ];
}

/// Resolved pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// SQLite file holding the job queue and the warehouse tables
    pub database_path: PathBuf,
    pub google_books_base_url: String,
    pub open_library_base_url: String,
    /// Maximum PENDING jobs pulled per worker invocation
    pub batch_size: usize,
    /// Total processing attempts before a job is marked FAILED
    pub retry_max_attempts: u32,
    /// Per-request timeout for source clients
    pub http_timeout_secs: u64,
    /// Per-source request quota
    pub requests_per_second: u32,
    /// Fallback tracing directive when RUST_LOG is unset
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            google_books_base_url: DEFAULT_GOOGLE_BOOKS_BASE_URL.to_string(),
            open_library_base_url: DEFAULT_OPEN_LIBRARY_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// TOML file contents; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub google_books_base_url: Option<String>,
    pub open_library_base_url: Option<String>,
    pub batch_size: Option<usize>,
    pub retry_max_attempts: Option<u32>,
    pub http_timeout_secs: Option<u64>,
    pub requests_per_second: Option<u32>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Command-line tier
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub retry_max_attempts: Option<u32>,
}

impl PipelineConfig {
    /// Resolve configuration from all tiers and validate the result
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();

        let config_file = overrides
            .config_file
            .clone()
            .or_else(|| std::env::var(env_keys::CONFIG_FILE).ok().map(PathBuf::from))
            .or_else(default_config_file);

        if let Some(path) = config_file {
            match load_toml_file(&path)? {
                Some(toml_config) => {
                    info!("Loaded configuration file: {}", path.display());
                    config.apply_toml(toml_config);
                }
                None => warn!(
                    "Configuration file not found: {} (using defaults)",
                    path.display()
                ),
            }
        }

        config.apply_env()?;
        config.apply_overrides(overrides);
        config.validate()?;

        debug!(?config, "Pipeline configuration resolved");
        Ok(config)
    }

    /// Overlay values present in a TOML file
    pub fn apply_toml(&mut self, toml_config: TomlConfig) {
        if let Some(v) = toml_config.database_path {
            self.database_path = v;
        }
        if let Some(v) = toml_config.google_books_base_url {
            self.google_books_base_url = v;
        }
        if let Some(v) = toml_config.open_library_base_url {
            self.open_library_base_url = v;
        }
        if let Some(v) = toml_config.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = toml_config.retry_max_attempts {
            self.retry_max_attempts = v;
        }
        if let Some(v) = toml_config.http_timeout_secs {
            self.http_timeout_secs = v;
        }
        if let Some(v) = toml_config.requests_per_second {
            self.requests_per_second = v;
        }
        if let Some(v) = toml_config.log_level {
            self.log_level = v;
        }
    }

    /// Overlay values present in the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_value::<PathBuf>(env_keys::DATABASE_PATH)? {
            self.database_path = v;
        }
        if let Some(v) = env_value::<String>(env_keys::GOOGLE_BOOKS_BASE_URL)? {
            self.google_books_base_url = v;
        }
        if let Some(v) = env_value::<String>(env_keys::OPEN_LIBRARY_BASE_URL)? {
            self.open_library_base_url = v;
        }
        if let Some(v) = env_value::<usize>(env_keys::BATCH_SIZE)? {
            self.batch_size = v;
        }
        if let Some(v) = env_value::<u32>(env_keys::RETRY_MAX_ATTEMPTS)? {
            self.retry_max_attempts = v;
        }
        if let Some(v) = env_value::<u64>(env_keys::HTTP_TIMEOUT_SECS)? {
            self.http_timeout_secs = v;
        }
        if let Some(v) = env_value::<u32>(env_keys::REQUESTS_PER_SECOND)? {
            self.requests_per_second = v;
        }
        if let Some(v) = env_value::<String>(env_keys::LOG_LEVEL)? {
            self.log_level = v;
        }
        Ok(())
    }

    /// Overlay command-line values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.database_path {
            self.database_path = v.clone();
        }
        if let Some(v) = overrides.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = overrides.retry_max_attempts {
            self.retry_max_attempts = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::Config("http_timeout_secs must be at least 1".to_string()));
        }
        if self.requests_per_second == 0 {
            return Err(Error::Config(
                "requests_per_second must be at least 1".to_string(),
            ));
        }
        if self.google_books_base_url.trim().is_empty() {
            return Err(Error::Config("google_books_base_url is empty".to_string()));
        }
        if self.open_library_base_url.trim().is_empty() {
            return Err(Error::Config("open_library_base_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Read and parse a TOML file; `Ok(None)` when the file does not exist
pub fn load_toml_file(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    TomlConfig::from_toml_str(&content).map(Some)
}

fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}

/// `<config_dir>/shelf/config.toml`, only if it exists
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("shelf").join("config.toml"))
        .filter(|path| path.exists())
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("shelf").join("warehouse.db"))
        .unwrap_or_else(|| PathBuf::from("./shelf_data/warehouse.db"))
}
