//! Input records
//!
//! One row of the source dataset: an ordered map of column name to raw value.
//! Records are immutable once read and are identified by their 1-based data
//! row number, which travels into the outcome record.

use serde::{Deserialize, Serialize};

/// A single input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// 1-based data row number (the header line is not counted)
    row: u64,
    /// Column values in source order; `None` when the row had no cell for the column
    #[serde(with = "ordered_fields")]
    fields: Vec<(String, Option<String>)>,
}

impl InputRecord {
    pub fn new(row: u64, fields: Vec<(String, Option<String>)>) -> Self {
        Self { row, fields }
    }

    /// Build a record where every column has a value. Mostly for tests and fixtures.
    pub fn from_pairs<K, V>(row: u64, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            row,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    pub fn row(&self) -> u64 {
        self.row
    }

    /// Whether the column exists in this record, regardless of its value
    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    /// Raw value of a column, `None` if the column is missing or absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Trimmed value of a column, `None` if missing, absent or blank
    pub fn get_trimmed(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Serializes the field list as a JSON object without losing column order.
mod ordered_fields {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    type Fields = Vec<(String, Option<String>)>;

    pub fn serialize<S: Serializer>(fields: &Fields, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(fields.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fields, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to optional string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Fields, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Option<String>>()? {
                    fields.push((key, value));
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
