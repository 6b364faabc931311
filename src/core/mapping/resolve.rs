//! Label to canonical identifier resolution for select fields

use super::date::canonical_date;
use super::error::{MappingError, ValueProcessingError};
use crate::core::payload::MetadataValue;
use crate::core::schema::{FieldOption, FieldSchema, FieldType};

fn same_text(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Resolve one value against the active options of a select field.
///
/// Identifiers are tried first; labels only when no identifier matched.
/// Both comparisons ignore case.
pub fn resolve_option<'a>(field: &'a FieldSchema, value: &str) -> Option<&'a str> {
    let active = || field.options().iter().filter(|o| o.is_active());

    active()
        .find(|o| same_text(&o.id, value))
        .or_else(|| active().find(|o| same_text(&o.label, value)))
        .map(|o: &FieldOption| o.id.as_str())
}

fn require_option(field: &FieldSchema, value: &str) -> Result<String, MappingError> {
    resolve_option(field, value)
        .map(str::to_string)
        .ok_or_else(|| MappingError::InvalidOption {
            value: value.to_string(),
            field: field.id.clone(),
        })
}

/// Convert a trimmed, non-blank cell into the field's canonical value.
///
/// Returns `Ok(None)` for a multi-select cell made only of separators.
pub fn resolve_value(
    field: &FieldSchema,
    raw: &str,
    separator: &str,
) -> Result<Option<MetadataValue>, MappingError> {
    match &field.field_type {
        FieldType::Text | FieldType::Number => Ok(Some(MetadataValue::from(raw))),
        FieldType::Date => canonical_date(raw)
            .map(|date| Some(MetadataValue::Single(date)))
            .map_err(|source| {
                ValueProcessingError {
                    value: raw.to_string(),
                    field: field.id.clone(),
                    source,
                }
                .into()
            }),
        FieldType::SingleSelect => {
            require_option(field, raw).map(|id| Some(MetadataValue::Single(id)))
        }
        FieldType::MultiSelect => {
            let ids = raw
                .split(separator)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| require_option(field, part))
                .collect::<Result<Vec<_>, _>>()?;

            Ok((!ids.is_empty()).then_some(MetadataValue::Multiple(ids)))
        }
        FieldType::Unsupported(field_type) => Err(MappingError::UnsupportedFieldType {
            field: field.id.clone(),
            field_type: field_type.clone(),
        }),
    }
}
