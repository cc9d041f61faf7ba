//! Queued units of work and their lifecycle

pub mod state_machine;
pub mod status;

pub use state_machine::{JobEvent, JobStateMachine, StateMachineError, StateMachineResult};
pub use status::{JobStatus, UnknownStatus};

use crate::source::BookIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One book waiting for (or done with) reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Authoritative identity for queue writes
    pub job_id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub status: JobStatus,
    pub retry_count: u32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// What the sources are asked about
    pub fn identity(&self) -> BookIdentity {
        BookIdentity {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }
}

/// Ingestion input; `(title, author)` is the dedup key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
}

/// Status write produced by the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub retry_count: u32,
    pub error_message: Option<String>,
}
