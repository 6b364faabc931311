//! Remote field schema
//!
//! Typed metadata fields as defined on the remote system, fetched once
//! before processing and read-only for the rest of the run.

mod types;

pub use types::{FieldOption, FieldSchema, FieldType, OptionState, SchemaSet};
pub(crate) use types::decode_fields_value;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching or validating the schema. Always fatal.
#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Failed to fetch field schema: {0}")]
    Fetch(String),

    #[error("Failed to decode field schema: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Field '{0}' is defined more than once in the schema")]
    DuplicateField(String),

    #[error("Option '{option}' is defined more than once for field '{field}'")]
    DuplicateOption { field: String, option: String },
}

/// Where field definitions come from
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_fields(&self) -> Result<Vec<FieldSchema>, InitializationError>;
}

/// Fixed, in-process schema. Used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaSource {
    fields: Vec<FieldSchema>,
}

impl StaticSchemaSource {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    /// Parse the remote wire format: either a bare array or `{"metadata_fields": [...]}`
    pub fn from_json(json: &str) -> Result<Self, InitializationError> {
        Ok(Self::new(types::decode_fields(json)?))
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn fetch_fields(&self) -> Result<Vec<FieldSchema>, InitializationError> {
        Ok(self.fields.clone())
    }
}
