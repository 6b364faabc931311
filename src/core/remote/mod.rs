//! Remote create/update operation
//!
//! The engine only sees [`RemoteOperation`]; [`ApiClient`] is the HTTP
//! implementation and also serves the field schema.

mod client;

pub use client::ApiClient;

use crate::core::payload::Payload;
use crate::utils::error::{ErrorCategory, ErrorClassification};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How the remote treated an accepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOutcome {
    Created,
    Overwritten,
    AlreadyExists,
}

impl RemoteOutcome {
    /// Classify from the response body's `existing` / `overwritten` flags
    pub fn classify(body: &Value) -> Self {
        let flag = |key: &str| body.get(key).and_then(Value::as_bool).unwrap_or(false);
        if flag("existing") {
            Self::AlreadyExists
        } else if flag("overwritten") {
            Self::Overwritten
        } else {
            Self::Created
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Overwritten => "overwritten",
            Self::AlreadyExists => "already_exists",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse {
    pub outcome: RemoteOutcome,
    pub body: Value,
}

impl OperationResponse {
    pub fn from_body(body: Value) -> Self {
        Self {
            outcome: RemoteOutcome::classify(&body),
            body,
        }
    }
}

/// Machine-readable reason for a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Rejected,
    Network,
    Unavailable,
    InvalidResponse,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Timeout => "timed out",
            Self::Rejected => "rejected",
            Self::Network => "network failure",
            Self::Unavailable => "service unavailable",
            Self::InvalidResponse => "invalid response",
        };
        f.write_str(text)
    }
}

/// The remote call failed for one record
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Remote operation {reason}: {message}")]
pub struct OperationError {
    pub reason: FailureReason,
    pub message: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Response body, when one was received
    pub response: Option<Value>,
}

impl OperationError {
    fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            status: None,
            response: None,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FailureReason::Timeout,
            format!("no response after {:?}", after),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Network, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FailureReason::InvalidResponse, message)
    }

    /// Map a non-success HTTP status to a failure
    pub fn from_status(status: u16, response: Option<Value>) -> Self {
        let reason = match status {
            408 | 504 => FailureReason::Timeout,
            429 | 500..=599 => FailureReason::Unavailable,
            _ => FailureReason::Rejected,
        };
        let message = response
            .as_ref()
            .and_then(remote_message)
            .unwrap_or_else(|| format!("HTTP status {}", status));

        Self {
            reason,
            message,
            status: Some(status),
            response,
        }
    }

    /// Outcome classification when the remote refused because the asset exists
    pub fn outcome(&self) -> Option<RemoteOutcome> {
        let exists = self.status == Some(409)
            || self.message.to_lowercase().contains("already exists");
        exists.then_some(RemoteOutcome::AlreadyExists)
    }
}

/// Pull a human-readable message out of common error body shapes
fn remote_message(body: &Value) -> Option<String> {
    body.pointer("/error/message")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl ErrorClassification for OperationError {
    fn code(&self) -> &'static str {
        match self.reason {
            FailureReason::Timeout => "operation.timeout",
            FailureReason::Rejected => "operation.rejected",
            FailureReason::Network => "operation.network",
            FailureReason::Unavailable => "operation.unavailable",
            FailureReason::InvalidResponse => "operation.invalid_response",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Remote
    }
}

/// The remote create/update capability
#[async_trait]
pub trait RemoteOperation: Send + Sync {
    async fn invoke(&self, payload: &Payload) -> Result<OperationResponse, OperationError>;
}
