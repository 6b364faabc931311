//! Per-record pipeline: build the payload, then invoke the remote operation

use super::types::{OutcomeRecord, ProcessingError};
use crate::core::payload::{BuiltPayload, PayloadBuilder};
use crate::core::record::InputRecord;
use crate::core::remote::{OperationError, RemoteOperation};
use crate::utils::error::ErrorClassification;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Turns one input record into one outcome record. Never fails.
#[derive(Clone)]
pub struct RecordProcessor {
    builder: Arc<PayloadBuilder>,
    remote: Arc<dyn RemoteOperation>,
    timeout: Duration,
}

impl RecordProcessor {
    pub fn new(
        builder: Arc<PayloadBuilder>,
        remote: Arc<dyn RemoteOperation>,
        timeout: Duration,
    ) -> Self {
        Self {
            builder,
            remote,
            timeout,
        }
    }

    pub async fn process(&self, record: InputRecord) -> OutcomeRecord {
        let started = Instant::now();
        let row = record.row();

        let BuiltPayload { payload, traces } = match self.builder.build(&record) {
            Ok(built) => built,
            Err(e) => {
                warn!(row, code = e.code(), "Payload construction failed: {}", e);
                let traces = e.traces().to_vec();
                return OutcomeRecord::failed(
                    record,
                    None,
                    &ProcessingError::from(e),
                    traces,
                    started.elapsed(),
                );
            }
        };

        let result = match tokio::time::timeout(self.timeout, self.remote.invoke(&payload)).await {
            Ok(result) => result,
            Err(_) => Err(OperationError::timeout(self.timeout)),
        };

        match result {
            Ok(response) => {
                debug!(row, outcome = response.outcome.as_str(), "Remote operation succeeded");
                OutcomeRecord::succeeded(record, payload, response, traces, started.elapsed())
            }
            Err(e) => {
                warn!(row, code = e.code(), "Remote operation failed: {}", e);
                OutcomeRecord::failed(
                    record,
                    Some(payload),
                    &ProcessingError::from(e),
                    traces,
                    started.elapsed(),
                )
            }
        }
    }
}
