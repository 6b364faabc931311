use super::InitializationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Declared type of a remote field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Date,
    SingleSelect,
    MultiSelect,
    /// Anything the mapper does not know how to fill
    Unsupported(String),
}

impl FieldType {
    pub fn is_select(&self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect)
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "text" | "string" => Self::Text,
            "number" | "integer" => Self::Number,
            "date" => Self::Date,
            "single-select" | "enum" => Self::SingleSelect,
            "multi-select" | "set" => Self::MultiSelect,
            _ => Self::Unsupported(raw),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Number => f.write_str("number"),
            Self::Date => f.write_str("date"),
            Self::SingleSelect => f.write_str("single-select"),
            Self::MultiSelect => f.write_str("multi-select"),
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionState {
    #[default]
    Active,
    Inactive,
}

/// One allowed value of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Canonical identifier stored by the remote system
    #[serde(rename = "external_id")]
    pub id: String,
    /// Human label shown to editors
    #[serde(rename = "value", alias = "label")]
    pub label: String,
    #[serde(default)]
    pub state: OptionState,
}

impl FieldOption {
    pub fn active(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            state: OptionState::Active,
        }
    }

    pub fn inactive(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            state: OptionState::Inactive,
            ..Self::active(id, label)
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == OptionState::Active
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Datasource {
    #[serde(default)]
    values: Vec<FieldOption>,
}

/// A remotely defined typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "external_id")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datasource: Option<Datasource>,
}

impl FieldSchema {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            field_type,
            datasource: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.datasource = Some(Datasource { values: options });
        self
    }

    /// Allowed options in schema order; empty for non-select fields
    pub fn options(&self) -> &[FieldOption] {
        self.datasource
            .as_ref()
            .map(|ds| ds.values.as_slice())
            .unwrap_or_default()
    }
}

/// Validated, indexed set of fields
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    fields: Vec<FieldSchema>,
    index: HashMap<String, usize>,
}

impl SchemaSet {
    /// Index the fields, rejecting duplicate field or option identifiers
    pub fn new(fields: Vec<FieldSchema>) -> Result<Self, InitializationError> {
        let mut index = HashMap::with_capacity(fields.len());

        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id.clone(), position).is_some() {
                return Err(InitializationError::DuplicateField(field.id.clone()));
            }

            let mut seen = HashSet::new();
            for option in field.options() {
                if !seen.insert(option.id.as_str()) {
                    return Err(InitializationError::DuplicateOption {
                        field: field.id.clone(),
                        option: option.id.clone(),
                    });
                }
            }
        }

        Ok(Self { fields, index })
    }

    pub fn get(&self, id: &str) -> Option<&FieldSchema> {
        self.index.get(id).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldsEnvelope {
    Wrapped { metadata_fields: Vec<FieldSchema> },
    Bare(Vec<FieldSchema>),
}

pub(super) fn decode_fields(json: &str) -> Result<Vec<FieldSchema>, serde_json::Error> {
    decode_fields_value(serde_json::from_str(json)?)
}

pub(crate) fn decode_fields_value(
    value: serde_json::Value,
) -> Result<Vec<FieldSchema>, serde_json::Error> {
    Ok(match serde_json::from_value(value)? {
        FieldsEnvelope::Wrapped { metadata_fields } => metadata_fields,
        FieldsEnvelope::Bare(fields) => fields,
    })
}
