//! Mapping error taxonomy
//!
//! Configuration defects (bad mapping) and data defects (bad cell values) share
//! [`MappingError`] but carry different codes and categories.

use crate::utils::error::{ErrorCategory, ErrorClassification};
use thiserror::Error;

/// The field mapping itself is wrong for this record or schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMappingError {
    #[error("Field mapping is empty")]
    Empty,

    #[error("Target field '{0}' is mapped from more than one column")]
    DuplicateTarget(String),

    #[error("Column '{0}' does not exist in the record")]
    MissingColumn(String),

    #[error("Field '{0}' does not exist in the schema")]
    UnknownField(String),
}

/// Why a date cell was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("'{0}' does not match YYYY-MM-DD or YYYY/MM/DD with an optional time of day")]
    Format(String),

    #[error("'{0}' mixes '-' and '/' as date separators")]
    MixedSeparators(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),

    #[error("'{0}' is not a valid time of day")]
    InvalidTime(String),
}

/// A cell value could not be converted for its target field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot process value '{value}' for field '{field}'")]
pub struct ValueProcessingError {
    pub value: String,
    pub field: String,
    #[source]
    pub source: DateParseError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Structured metadata mapper used before initialization")]
    NotInitialized,

    #[error("Invalid field mapping")]
    InvalidMapping(#[from] InvalidMappingError),

    #[error(transparent)]
    ValueProcessing(#[from] ValueProcessingError),

    #[error("Value '{value}' is not an active option of field '{field}'")]
    InvalidOption { value: String, field: String },

    #[error("Field '{field}' has unsupported type '{field_type}'")]
    UnsupportedFieldType { field: String, field_type: String },
}

impl ErrorClassification for MappingError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "mapping.not_initialized",
            Self::InvalidMapping(InvalidMappingError::Empty) => "mapping.empty",
            Self::InvalidMapping(InvalidMappingError::DuplicateTarget(_)) => {
                "mapping.duplicate_target"
            }
            Self::InvalidMapping(InvalidMappingError::MissingColumn(_)) => "mapping.missing_column",
            Self::InvalidMapping(InvalidMappingError::UnknownField(_)) => "mapping.unknown_field",
            Self::ValueProcessing(_) => "mapping.invalid_value",
            Self::InvalidOption { .. } => "mapping.invalid_option",
            Self::UnsupportedFieldType { .. } => "mapping.unsupported_field_type",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotInitialized => ErrorCategory::Internal,
            Self::InvalidMapping(_) | Self::UnsupportedFieldType { .. } => {
                ErrorCategory::Configuration
            }
            Self::ValueProcessing(_) | Self::InvalidOption { .. } => ErrorCategory::Data,
        }
    }
}
