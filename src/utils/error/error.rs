//! Error handling for the migration runner
//!
//! This module defines the fatal error family. Anything surfaced as a
//! [`MigrationError`] aborts the run; per-record failures live in
//! [`crate::core::batch::ProcessingError`] and never reach this type.

use crate::core::plugins::PluginError;
use crate::core::recorder::RecorderError;
use crate::core::schema::InitializationError;
use crate::core::source::SourceError;
use thiserror::Error;

/// Result type alias for fatal, process-level operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Process-level error type. Any variant halts the run.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record source could not be opened or read
    #[error("Record source error: {0}")]
    Source(#[from] SourceError),

    /// Schema fetch or validation failed during startup
    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    /// Plugin registry errors (unknown plugin, bad options, failed initialize)
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// The durable log rejected a write
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV errors raised while writing reports
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Background task failed to join
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MigrationError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
