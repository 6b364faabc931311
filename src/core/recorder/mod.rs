//! Durable run log
//!
//! Every line of the log is one self-describing JSON object tagged with
//! `"type"`. Outcome entries are the audit trail of a run; the run framing
//! entries make a log readable on its own.

mod jsonl;

pub use jsonl::JsonlRecorder;

use crate::core::batch::{OutcomeRecord, RunStatistics};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    RunStarted {
        run_id: Uuid,
        timestamp: DateTime<Utc>,
        concurrency: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    Outcome(OutcomeRecord),
    RunCompleted {
        run_id: Uuid,
        timestamp: DateTime<Utc>,
        statistics: RunStatistics,
    },
}

impl LogEntry {
    pub fn run_started(run_id: Uuid, concurrency: usize, source: Option<String>) -> Self {
        Self::RunStarted {
            run_id,
            timestamp: Utc::now(),
            concurrency,
            source,
        }
    }

    pub fn run_completed(run_id: Uuid, statistics: RunStatistics) -> Self {
        Self::RunCompleted {
            run_id,
            timestamp: Utc::now(),
            statistics,
        }
    }

    pub fn as_outcome(&self) -> Option<&OutcomeRecord> {
        match self {
            Self::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Failed to write run log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize log entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only sink for log entries.
///
/// Implementations must accept concurrent appends and write each entry as
/// one unit; a failed append is fatal to the run.
#[async_trait]
pub trait Recorder: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), RecorderError>;

    async fn flush(&self) -> Result<(), RecorderError> {
        Ok(())
    }
}

/// Keeps entries in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn outcomes(&self) -> Vec<OutcomeRecord> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Outcome(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Recorder for MemoryRecorder {
    async fn append(&self, entry: &LogEntry) -> Result<(), RecorderError> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        Ok(())
    }
}
