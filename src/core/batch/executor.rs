//! Bounded-concurrency execution engine

use super::types::{OutcomeRecord, ProcessingError, RunCounters, RunStatistics};
use crate::core::record::InputRecord;
use crate::core::recorder::{LogEntry, Recorder, RecorderError};
use crate::core::source::SourceError;
use crate::utils::error::{MigrationError, Result};
use futures::{FutureExt, Stream, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

/// Configuration for the execution engine
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum records processed at once (default: 10)
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 10 }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Runs `process_one` over a record stream with at most `concurrency`
/// records in flight, recording exactly one outcome per record pulled.
pub struct BatchExecutor {
    config: BatchConfig,
    recorder: Arc<dyn Recorder>,
}

impl BatchExecutor {
    pub fn new(config: BatchConfig, recorder: Arc<dyn Recorder>) -> Self {
        Self { config, recorder }
    }

    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }

    /// Process every record of `records`.
    ///
    /// A record is only pulled once a worker slot is free, so the source is
    /// read no further ahead than the workers can take. Per-record failures
    /// (including panics) become `FAILED` outcomes. A source or recorder
    /// failure stops intake; in-flight records are drained before the error
    /// is returned.
    pub async fn run<S, F, Fut>(&self, mut records: S, process_one: F) -> Result<RunStatistics>
    where
        S: Stream<Item = std::result::Result<InputRecord, SourceError>> + Unpin,
        F: Fn(InputRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OutcomeRecord> + Send + 'static,
    {
        let started = Instant::now();
        let process_one = Arc::new(process_one);
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let counters = Arc::new(RunCounters::new());
        let mut tasks: JoinSet<std::result::Result<(), RecorderError>> = JoinSet::new();
        let mut fatal: Option<MigrationError> = None;

        info!(concurrency = self.config.concurrency, "Starting batch");

        loop {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    fatal = Some(MigrationError::Internal(format!("Worker pool closed: {}", e)));
                    break;
                }
            };

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = flatten(joined) {
                    fatal.get_or_insert(e);
                }
            }
            if fatal.is_some() {
                break;
            }

            let record = match records.next().await {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    error!("Record source failed: {}", e);
                    fatal = Some(e.into());
                    break;
                }
                None => break,
            };

            counters.start();
            let process_one = Arc::clone(&process_one);
            let recorder = Arc::clone(&self.recorder);
            let counters = Arc::clone(&counters);

            tasks.spawn(async move {
                let row = record.row();
                let fallback = record.clone();
                let outcome = match AssertUnwindSafe(async move { process_one(record).await })
                    .catch_unwind()
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!(row, "Record processing panicked: {}", message);
                        OutcomeRecord::failed(
                            fallback,
                            None,
                            &ProcessingError::Panicked(message),
                            Vec::new(),
                            Duration::ZERO,
                        )
                    }
                };

                let status = outcome.status;
                let result = recorder.append(&LogEntry::Outcome(outcome)).await;
                counters.finish(status);
                drop(permit);

                debug!(row, status = %status, "Record finished");
                result
            });
        }

        if fatal.is_some() && !tasks.is_empty() {
            info!("Draining {} in-flight records", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = flatten(joined) {
                fatal.get_or_insert(e);
            }
        }

        if let Err(e) = self.recorder.flush().await {
            fatal.get_or_insert(e.into());
        }

        let statistics = counters.snapshot(started.elapsed());
        if let Some(e) = fatal {
            error!(
                attempted = statistics.attempted,
                "Batch aborted: {}", e
            );
            return Err(e);
        }

        info!(
            attempted = statistics.attempted,
            succeeded = statistics.succeeded,
            failed = statistics.failed,
            duration_ms = statistics.duration_ms,
            "Batch completed"
        );
        Ok(statistics)
    }
}

fn flatten(
    joined: std::result::Result<std::result::Result<(), RecorderError>, JoinError>,
) -> Result<()> {
    match joined {
        Ok(result) => result.map_err(|e| {
            error!("Failed to record outcome: {}", e);
            MigrationError::from(e)
        }),
        Err(e) => Err(MigrationError::Internal(format!("Worker task failed: {}", e))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
