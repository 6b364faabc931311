//! Execution engine
//!
//! [`BatchExecutor`] drives a record stream through a caller-supplied
//! `process_one` with bounded concurrency; [`RecordProcessor`] is the
//! standard `process_one` (build payload, invoke remote).

mod executor;
mod processor;
mod types;


pub use executor::{BatchConfig, BatchExecutor};
pub use processor::RecordProcessor;
pub use types::{OutcomeRecord, OutcomeStatus, ProcessingError, RunCounters, RunStatistics};
