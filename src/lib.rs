//! # asset-migrate
//!
//! Bulk migration of assets into a remote asset API, one create/update call
//! per input row, with bounded concurrency and a durable per-record audit log.
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most `concurrency` records in flight; the
//!   input is read lazily
//! - **Exactly one outcome per record**: failures, timeouts and panics are
//!   all recorded as `FAILED` outcomes and never stop the run
//! - **Structured metadata mapping**: input labels are resolved to the
//!   canonical values of remotely-defined typed fields
//! - **Re-runnable reports**: the JSONL run log projects into a CSV table
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use asset_migrate::{Config, Migration, MigrationContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::from_file("config/migrate.yaml").await?;
//!     config.apply_process_env()?;
//!     config.validate()?;
//!
//!     let context = MigrationContext::from_config(config).await?;
//!     let migration = Migration::prepare(context).await?;
//!     let stats = migration.run().await?;
//!     println!("{} succeeded, {} failed", stats.succeeded, stats.failed);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::batch::{
    BatchConfig, BatchExecutor, OutcomeRecord, OutcomeStatus, ProcessingError, RecordProcessor,
    RunStatistics,
};
pub use core::mapping::{FieldMappingConfig, MappingError, StructuredMetadataMapper};
pub use core::migration::{Migration, MigrationContext};
pub use core::payload::{Payload, PayloadBuilder};
pub use core::plugins::{Plugin, PluginRegistry};
pub use core::record::InputRecord;
pub use core::recorder::{JsonlRecorder, LogEntry, MemoryRecorder, Recorder};
pub use core::remote::{ApiClient, OperationError, RemoteOperation};
pub use core::report::{ReportGenerator, ReportSummary};
pub use core::source::CsvRecordSource;
pub use utils::error::{MigrationError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
