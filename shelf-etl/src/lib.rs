//! shelf-etl library interface
//!
//! Book metadata reconciliation: pulls PENDING jobs, fetches Google Books
//! and Open Library records, merges them into canonical dimension and fact
//! rows, and loads them into the SQLite star-schema warehouse.

pub mod db;
pub mod error;
pub mod job;
pub mod normalize;
pub mod publisher;
pub mod reconcile;
pub mod similarity;
pub mod source;
pub mod workflow;

pub use crate::error::{PipelineError, Result};
pub use crate::job::{Job, JobEvent, JobStateMachine, JobStatus, JobUpdate, NewJob};
pub use crate::reconcile::{reconcile, ReconciledBook};
pub use crate::source::{BookIdentity, BookSource, SourceDocument, SourceOrigin};
pub use crate::workflow::{RunSummary, Worker};
