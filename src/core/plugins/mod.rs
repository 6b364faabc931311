//! Enrichment plugins
//!
//! A plugin is one step of payload construction: it reads the input record and
//! writes into the payload's options region. Plugins are compiled in and looked
//! up by name from a [`PluginRegistry`] built at startup.

mod registry;
mod tags;

pub use registry::PluginRegistry;
pub use tags::{TAGS, TagsPlugin};

use crate::core::mapping::{MappingError, STRUCTURED_METADATA, StructuredMetadataMapper};
use crate::core::payload::PayloadOptions;
use crate::core::record::InputRecord;
use crate::core::schema::{InitializationError, SchemaSource};
use crate::utils::error::{ErrorCategory, ErrorClassification};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{0}' is not registered")]
    NotFound(String),

    #[error("Plugin '{0}' is registered twice")]
    Duplicate(String),

    #[error("Plugin registry used before initialization")]
    RegistryNotInitialized,

    #[error("Plugin '{plugin}' failed to initialize")]
    Initialization {
        plugin: String,
        #[source]
        source: InitializationError,
    },

    #[error("Invalid settings for plugin '{plugin}': {message}")]
    InvalidSettings { plugin: String, message: String },

    #[error("Column '{column}' required by plugin '{plugin}' does not exist in the record")]
    MissingColumn { plugin: String, column: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl PluginError {
    pub fn invalid_settings(plugin: &str, message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }
}

impl ErrorClassification for PluginError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "plugin.not_found",
            Self::Duplicate(_) => "plugin.duplicate",
            Self::RegistryNotInitialized => "plugin.not_initialized",
            Self::Initialization { .. } => "plugin.initialization",
            Self::InvalidSettings { .. } => "plugin.invalid_settings",
            Self::MissingColumn { .. } => "plugin.missing_column",
            Self::Mapping(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::RegistryNotInitialized | Self::Initialization { .. } => ErrorCategory::Internal,
            Self::NotFound(_)
            | Self::Duplicate(_)
            | Self::InvalidSettings { .. }
            | Self::MissingColumn { .. } => ErrorCategory::Configuration,
            Self::Mapping(e) => e.category(),
        }
    }
}

/// One enrichment step
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// One-time setup before any `process` call
    async fn initialize(&self) -> Result<(), PluginError>;

    /// Reject malformed settings at startup instead of on every record
    fn validate_settings(&self, _settings: &Value) -> Result<(), PluginError> {
        Ok(())
    }

    /// Enrich `options` from `record`; the returned value is kept as trace output
    fn process(
        &self,
        options: &mut PayloadOptions,
        record: &InputRecord,
        settings: &Value,
    ) -> Result<Value, PluginError>;
}

/// Names of the compiled-in plugins
pub const BUILTIN_PLUGINS: &[&str] = &[STRUCTURED_METADATA, TAGS];

/// Construct a compiled-in plugin by name
pub fn builtin_plugin(
    name: &str,
    schema_source: &Arc<dyn SchemaSource>,
) -> Result<Arc<dyn Plugin>, PluginError> {
    match name {
        STRUCTURED_METADATA => Ok(Arc::new(StructuredMetadataMapper::new(Arc::clone(
            schema_source,
        )))),
        TAGS => Ok(Arc::new(TagsPlugin)),
        other => Err(PluginError::NotFound(other.to_string())),
    }
}
