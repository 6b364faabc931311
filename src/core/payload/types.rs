use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Where the asset lives and what the remote should call it.
/// Fixed once the builder has read it from the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLocator {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Canonical value of one typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// The part of a payload that enrichment plugins are allowed to change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadOptions {
    /// Canonical values keyed by target field id; absent rather than empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Static upload parameters from configuration
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl PayloadOptions {
    pub fn with_params(params: Map<String, Value>) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn metadata_value(&self, field: &str) -> Option<&MetadataValue> {
        self.metadata.as_ref().and_then(|m| m.get(field))
    }
}

/// Request body keys owned by the payload itself; static params may not use them
pub const RESERVED_PARAMS: &[&str] = &["file", "public_id", "tags", "metadata"];

/// Outbound request for one input record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    locator: AssetLocator,
    options: PayloadOptions,
}

impl Payload {
    pub(crate) fn new(locator: AssetLocator, options: PayloadOptions) -> Self {
        Self { locator, options }
    }

    pub fn locator(&self) -> &AssetLocator {
        &self.locator
    }

    pub fn options(&self) -> &PayloadOptions {
        &self.options
    }

    /// Flat JSON body for the create/update call: `file`, optional `public_id`,
    /// static params, `tags` and `metadata`.
    pub fn request_body(&self) -> Value {
        let mut body = self.options.params.clone();
        body.insert("file".to_string(), Value::String(self.locator.uri.clone()));
        if let Some(name) = &self.locator.name {
            body.insert("public_id".to_string(), Value::String(name.clone()));
        }
        if !self.options.tags.is_empty() {
            body.insert("tags".to_string(), Value::from(self.options.tags.clone()));
        }
        if let Some(metadata) = &self.options.metadata {
            if let Ok(value) = serde_json::to_value(metadata) {
                body.insert("metadata".to_string(), value);
            }
        }
        Value::Object(body)
    }
}

/// Trace output of one enrichment step, tagged with the step's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginTrace {
    pub plugin: String,
    pub trace: Value,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuiltPayload {
    pub payload: Payload,
    pub traces: Vec<PluginTrace>,
}
