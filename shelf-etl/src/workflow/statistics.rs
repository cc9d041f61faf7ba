//! Run statistics
//!
//! Counters for one worker run, logged as the run summary.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-source fetch outcome counts
///
/// Display: "N ok, M empty"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Fetches that returned a document
    pub successes: usize,
    /// Fetches that returned nothing (error, non-success status, no match)
    pub failures: usize,
}

impl SourceStats {
    pub fn record(&mut self, found: bool) {
        if found {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }

    pub fn display_string(&self) -> String {
        format!("{} ok, {} empty", self.successes, self.failures)
    }
}

/// **Run summary**
///
/// Display: "N jobs: C completed, R retrying, F failed, U update errors, A aborted"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// PENDING jobs picked up by the run
    pub total_fetched: usize,
    pub completed: usize,
    /// Returned to PENDING with retries left
    pub marked_for_retry: usize,
    /// Retry budget exhausted
    pub permanently_failed: usize,
    /// Queue writes that affected no row
    pub job_update_failures: usize,
    /// Stopped by an error the state machine never saw (store or transition)
    pub aborted: usize,
    /// Error messages in job order
    pub errors: Vec<String>,
    pub google_books: SourceStats,
    pub open_library: SourceStats,
}

impl RunSummary {
    pub fn new(total_fetched: usize) -> Self {
        Self {
            total_fetched,
            ..Self::default()
        }
    }

    /// Jobs with a recorded outcome
    pub fn processed(&self) -> usize {
        self.completed
            + self.marked_for_retry
            + self.permanently_failed
            + self.job_update_failures
            + self.aborted
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} jobs: {} completed, {} retrying, {} failed, {} update errors, {} aborted",
            self.total_fetched,
            self.completed,
            self.marked_for_retry,
            self.permanently_failed,
            self.job_update_failures,
            self.aborted
        )
    }

    pub fn log(&self) {
        info!(
            total_fetched = self.total_fetched,
            completed = self.completed,
            marked_for_retry = self.marked_for_retry,
            permanently_failed = self.permanently_failed,
            job_update_failures = self.job_update_failures,
            aborted = self.aborted,
            errors = self.errors.len(),
            google_books = %self.google_books.display_string(),
            open_library = %self.open_library.display_string(),
            "Run complete: {}",
            self.display_string()
        );
    }
}
