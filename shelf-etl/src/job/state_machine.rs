//! Job state machine
//!
//! Pure transition logic: given a job's current status and retry count and
//! the outcome of a processing step, decide the next status, retry count and
//! error message. Writing the result back is the queue's job.

use super::{JobStatus, JobUpdate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Outcome reported by a pipeline phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobEvent {
    /// At least one source returned data
    ExtractionSucceeded,
    /// Every load phase committed
    Committed,
    /// Extraction, reconciliation or persistence failed
    Failed(String),
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::ExtractionSucceeded => write!(f, "extraction_succeeded"),
            JobEvent::Committed => write!(f, "committed"),
            JobEvent::Failed(_) => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {event}")]
    InvalidTransition { from: JobStatus, event: String },
}

pub type StateMachineResult<T> = std::result::Result<T, StateMachineError>;

/// Bounded-retry transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStateMachine {
    max_retries: u32,
}

impl JobStateMachine {
    /// `max_retries` is the total number of processing attempts a job gets
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Next state for a job currently in `status` with `retry_count`
    ///
    /// A failure while another attempt remains returns the job to PENDING
    /// with the count incremented; the last allowed failure pins the count
    /// at `max_retries` and marks the job FAILED. Terminal states reject
    /// every event.
    pub fn transition(
        &self,
        status: JobStatus,
        retry_count: u32,
        event: &JobEvent,
    ) -> StateMachineResult<JobUpdate> {
        let invalid = || StateMachineError::InvalidTransition {
            from: status,
            event: event.to_string(),
        };

        if status.is_terminal() {
            return Err(invalid());
        }

        let update = match (status, event) {
            (JobStatus::Pending, JobEvent::ExtractionSucceeded) => JobUpdate {
                status: JobStatus::Processing,
                retry_count,
                error_message: None,
            },

            (JobStatus::Processing, JobEvent::Committed) => JobUpdate {
                status: JobStatus::Completed,
                retry_count,
                error_message: None,
            },

            (JobStatus::Pending | JobStatus::Processing, JobEvent::Failed(reason)) => {
                self.on_failure(retry_count, reason)
            }

            _ => return Err(invalid()),
        };

        Ok(update)
    }

    fn on_failure(&self, retry_count: u32, reason: &str) -> JobUpdate {
        let attempt = retry_count.saturating_add(1);

        if attempt < self.max_retries {
            JobUpdate {
                status: JobStatus::Pending,
                retry_count: attempt,
                error_message: Some(format!(
                    "Attempt {} of {} failed: {}",
                    attempt, self.max_retries, reason
                )),
            }
        } else {
            JobUpdate {
                status: JobStatus::Failed,
                retry_count: self.max_retries,
                error_message: Some(format!(
                    "Permanently failed after {} attempts: {}",
                    self.max_retries, reason
                )),
            }
        }
    }
}
