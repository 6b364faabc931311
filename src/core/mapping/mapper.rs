//! Structured metadata mapper
//!
//! Turns business labels in input columns into the canonical values the
//! remote field schema expects, and merges them into the payload's metadata.

use super::error::{InvalidMappingError, MappingError};
use super::resolve::resolve_value;
use crate::core::payload::{MetadataValue, PayloadOptions};
use crate::core::plugins::{Plugin, PluginError};
use crate::core::record::InputRecord;
use crate::core::schema::{InitializationError, SchemaSet, SchemaSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Name under which the mapper is registered as a plugin
pub const STRUCTURED_METADATA: &str = "structured_metadata";

fn default_separator() -> String {
    ",".to_string()
}

/// Column to target-field mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingConfig {
    /// Source column name -> target field id
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
    /// Separator between values of a multi-select cell
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for FieldMappingConfig {
    fn default() -> Self {
        Self {
            mapping: BTreeMap::new(),
            separator: default_separator(),
        }
    }
}

impl FieldMappingConfig {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapping: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// What one `map` call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTrace {
    /// Target fields written, in mapping order
    pub fields_written: Vec<String>,
    /// Columns skipped because their value was absent or blank
    pub columns_skipped: Vec<String>,
}

pub struct StructuredMetadataMapper {
    source: Arc<dyn SchemaSource>,
    schema: OnceCell<SchemaSet>,
}

impl StructuredMetadataMapper {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            schema: OnceCell::new(),
        }
    }

    /// Fetch and index the field schema. Runs the fetch at most once.
    pub async fn initialize(&self) -> Result<(), InitializationError> {
        self.schema
            .get_or_try_init(|| async {
                let fields = self.source.fetch_fields().await?;
                let schema = SchemaSet::new(fields)?;
                info!(fields = schema.len(), "Loaded structured metadata schema");
                Ok::<_, InitializationError>(schema)
            })
            .await?;
        Ok(())
    }

    pub fn schema(&self) -> Result<&SchemaSet, MappingError> {
        self.schema.get().ok_or(MappingError::NotInitialized)
    }

    /// Map one record into `options.metadata`.
    ///
    /// Validation and value resolution both finish before anything is written,
    /// so on error `options` is untouched.
    pub fn map(
        &self,
        options: &mut PayloadOptions,
        record: &InputRecord,
        config: &FieldMappingConfig,
    ) -> Result<MappingTrace, MappingError> {
        let schema = self.schema()?;
        validate_mapping(config, record, schema)?;

        let mut trace = MappingTrace::default();
        let mut resolved: Vec<(String, MetadataValue)> = Vec::with_capacity(config.mapping.len());

        for (column, target) in &config.mapping {
            let Some(raw) = record.get_trimmed(column) else {
                trace.columns_skipped.push(column.clone());
                continue;
            };
            // validate_mapping guarantees the field exists
            let Some(field) = schema.get(target) else {
                return Err(InvalidMappingError::UnknownField(target.clone()).into());
            };

            match resolve_value(field, raw, &config.separator)? {
                Some(value) => resolved.push((target.clone(), value)),
                None => trace.columns_skipped.push(column.clone()),
            }
        }

        if !resolved.is_empty() {
            let metadata = options.metadata.get_or_insert_with(BTreeMap::new);
            for (target, value) in resolved {
                trace.fields_written.push(target.clone());
                metadata.insert(target, value);
            }
        }
        if options.metadata.as_ref().is_some_and(BTreeMap::is_empty) {
            options.metadata = None;
        }

        debug!(
            row = record.row(),
            written = trace.fields_written.len(),
            "Mapped structured metadata"
        );
        Ok(trace)
    }
}

/// Check the mapping against the record and schema, reporting the first problem.
///
/// Checks run in a fixed order (empty, duplicate targets, missing columns,
/// unknown fields) over the mapping in column-name order, so the reported
/// violation is the same for the same inputs.
pub fn validate_mapping(
    config: &FieldMappingConfig,
    record: &InputRecord,
    schema: &SchemaSet,
) -> Result<(), InvalidMappingError> {
    if config.mapping.is_empty() {
        return Err(InvalidMappingError::Empty);
    }

    let mut targets = HashSet::with_capacity(config.mapping.len());
    for target in config.mapping.values() {
        if !targets.insert(target.as_str()) {
            return Err(InvalidMappingError::DuplicateTarget(target.clone()));
        }
    }

    if let Some(column) = config.mapping.keys().find(|c| !record.contains(c)) {
        return Err(InvalidMappingError::MissingColumn(column.clone()));
    }

    if let Some(target) = config.mapping.values().find(|t| !schema.contains(t)) {
        return Err(InvalidMappingError::UnknownField(target.clone()));
    }

    Ok(())
}

fn parse_settings(settings: &Value) -> Result<FieldMappingConfig, PluginError> {
    let config: FieldMappingConfig = match settings {
        Value::Null => FieldMappingConfig::default(),
        other => serde_json::from_value(other.clone())
            .map_err(|e| PluginError::invalid_settings(STRUCTURED_METADATA, e.to_string()))?,
    };

    if config.separator.is_empty() {
        return Err(PluginError::invalid_settings(
            STRUCTURED_METADATA,
            "separator must not be empty",
        ));
    }
    Ok(config)
}

#[async_trait]
impl Plugin for StructuredMetadataMapper {
    fn name(&self) -> &str {
        STRUCTURED_METADATA
    }

    async fn initialize(&self) -> Result<(), PluginError> {
        StructuredMetadataMapper::initialize(self)
            .await
            .map_err(|source| PluginError::Initialization {
                plugin: STRUCTURED_METADATA.to_string(),
                source,
            })
    }

    fn validate_settings(&self, settings: &Value) -> Result<(), PluginError> {
        parse_settings(settings).map(|_| ())
    }

    fn process(
        &self,
        options: &mut PayloadOptions,
        record: &InputRecord,
        settings: &Value,
    ) -> Result<Value, PluginError> {
        let config = parse_settings(settings)?;
        let trace = self.map(options, record, &config)?;
        Ok(serde_json::to_value(trace).unwrap_or(Value::Null))
    }
}
