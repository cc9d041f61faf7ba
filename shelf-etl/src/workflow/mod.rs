//! Batch workflow
//!
//! One worker run pulls a batch of PENDING jobs and takes each one through
//! extraction, reconciliation and loading, sequentially:
//! 1. Fetch both sources (a single empty source is degraded success)
//! 2. Mark the job PROCESSING
//! 3. Reconcile and load all phases in one transaction
//! 4. Mark the job COMPLETED, or route the error through the retry decision

pub mod loader;
pub mod statistics;
pub mod worker;

pub use loader::{load_book, LoadReceipt};
pub use statistics::{RunSummary, SourceStats};
pub use worker::{JobOutcome, Worker};
