//! Error types for shelf-etl
//!
//! Every failure that reaches a job routes through the retry/fail decision
//! of the job state machine. Extraction failures on a single source are
//! not errors at all; source clients reduce them to "no result".

use crate::job::StateMachineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither source returned usable data
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    /// Source data could not be turned into a loadable record set
    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    /// Upsert or transaction failure in the warehouse
    #[error("Persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Queue write affected no row
    #[error("Job update failed for job {job_id}: {reason}")]
    JobUpdate { job_id: i64, reason: String },

    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    #[error(transparent)]
    Common(#[from] shelf_common::Error),
}

impl PipelineError {
    /// Short machine-readable kind, recorded in the job's error message
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ExtractionFailure(_) => "extraction",
            PipelineError::Reconciliation(_) => "reconciliation",
            PipelineError::Persistence(_) => "persistence",
            PipelineError::JobUpdate { .. } => "job_update",
            PipelineError::StateMachine(_) => "state_machine",
            PipelineError::Common(_) => "common",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
