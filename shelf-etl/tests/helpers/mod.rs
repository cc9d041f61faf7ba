//! Test Helper Utilities
//!
//! Shared utilities for testing shelf-etl

#![allow(dead_code)]

pub mod db_utils;
pub mod sources;

// Re-export commonly used items
pub use db_utils::{count_rows, create_test_db, enqueue, job_status, test_config};
pub use sources::{google_books_doc, open_library_doc, FakeSource};
