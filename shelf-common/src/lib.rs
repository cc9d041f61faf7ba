//! # Shelf Common Library
//!
//! Shared code for the shelf book-warehouse pipeline:
//! - Error type and result alias
//! - Pipeline configuration loading
//! - SQLite pool initialization
//! - Timestamp and date-key utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use config::PipelineConfig;
pub use error::{Error, Result};
