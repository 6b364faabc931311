use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// Who has to act on an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration, // fix the mapping/plugin config
    Data,          // fix this row of input
    Remote,        // the remote API refused or failed
    Internal,      // bug in this tool
}

/// Stable machine-readable classification of a per-record error
pub trait ErrorClassification {
    /// Dotted error code, e.g. `mapping.invalid_option`
    fn code(&self) -> &'static str;

    fn category(&self) -> ErrorCategory;
}

/// Serialized form of a per-record error inside an outcome record.
///
/// `causes` holds the `source()` chain, outermost first, so the original
/// triggering condition is readable from the log alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn from_error<E>(error: &E) -> Self
    where
        E: ErrorClassification + StdError,
    {
        Self {
            code: error.code().to_string(),
            category: error.category(),
            message: error.to_string(),
            causes: ErrorUtils::source_chain(error),
        }
    }

    /// Single-line rendering used by the report generator
    pub fn render(&self) -> String {
        if self.causes.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, self.causes.join(": "))
        }
    }
}

pub struct ErrorUtils;

impl ErrorUtils {
    /// Collect the messages of every error below `error` in its source chain
    pub fn source_chain(error: &dyn StdError) -> Vec<String> {
        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(cause) = current {
            causes.push(cause.to_string());
            current = cause.source();
        }
        causes
    }
}
