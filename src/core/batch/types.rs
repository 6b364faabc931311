//! Outcome records, run statistics and the per-record error family

use crate::core::payload::{ConstructionError, Payload, PluginTrace};
use crate::core::record::InputRecord;
use crate::core::remote::{OperationError, OperationResponse, RemoteOutcome};
use crate::utils::error::{ErrorCategory, ErrorClassification, ErrorReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Final status of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that fail a single record. The engine turns every one of these
/// into a `FAILED` outcome; none of them stop the run.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Record processing panicked: {0}")]
    Panicked(String),
}

impl ErrorClassification for ProcessingError {
    fn code(&self) -> &'static str {
        match self {
            Self::Construction(e) => e.code(),
            Self::Operation(e) => e.code(),
            Self::Panicked(_) => "internal.panic",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Construction(e) => e.category(),
            Self::Operation(e) => e.category(),
            Self::Panicked(_) => ErrorCategory::Internal,
        }
    }
}

/// Durable result of processing one input record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub timestamp: DateTime<Utc>,
    pub record: InputRecord,
    /// Payload sent, or `None` when construction failed
    pub payload: Option<Payload>,
    /// Raw remote response body, when one was received
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_outcome: Option<RemoteOutcome>,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<PluginTrace>,
    pub duration_ms: u64,
}

impl OutcomeRecord {
    pub fn succeeded(
        record: InputRecord,
        payload: Payload,
        response: OperationResponse,
        traces: Vec<PluginTrace>,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            record,
            payload: Some(payload),
            response: Some(response.body),
            remote_outcome: Some(response.outcome),
            status: OutcomeStatus::Succeeded,
            error: None,
            traces,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn failed(
        record: InputRecord,
        payload: Option<Payload>,
        error: &ProcessingError,
        traces: Vec<PluginTrace>,
        elapsed: Duration,
    ) -> Self {
        let (response, remote_outcome) = match error {
            ProcessingError::Operation(e) => (e.response.clone(), e.outcome()),
            _ => (None, None),
        };

        Self {
            timestamp: Utc::now(),
            record,
            payload,
            response,
            remote_outcome,
            status: OutcomeStatus::Failed,
            error: Some(ErrorReport::from_error(error)),
            traces,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

/// Snapshot of the run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub in_flight: u64,
    /// Highest number of records processed at once
    pub peak_in_flight: u64,
    pub duration_ms: u64,
}

/// Counters shared by all workers of a run
#[derive(Debug, Default)]
pub struct RunCounters {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record was taken from the source and handed to a worker
    pub fn start(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
    }

    /// The record's outcome has been recorded
    pub fn finish(&self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Succeeded => self.succeeded.fetch_add(1, Ordering::Relaxed),
            OutcomeStatus::Failed => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn snapshot(&self, elapsed: Duration) -> RunStatistics {
        RunStatistics {
            attempted: self.attempted.load(Ordering::Acquire),
            succeeded: self.succeeded.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
            in_flight: self.in_flight.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}
