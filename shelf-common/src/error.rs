//! Shared error type
//!
//! Covers what the common crate itself can fail on: opening the SQLite
//! store, touching its directory, and resolving configuration. Pipeline
//! crates wrap it in their own error enums.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Pool creation or schema statement failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database directory could not be created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or malformed TOML, bad env value, or failed validation
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        fn create(path: &std::path::Path) -> Result<()> {
            std::fs::create_dir_all(path)?;
            Ok(())
        }

        let file = tempfile::NamedTempFile::new().unwrap();
        // A directory cannot be created beneath a regular file
        let result = create(&file.path().join("nested"));

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("batch_size must be at least 1".to_string());
        assert_eq!(err.to_string(), "Configuration error: batch_size must be at least 1");
    }
}
