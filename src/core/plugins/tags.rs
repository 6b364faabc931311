use super::{Plugin, PluginError};
use crate::core::payload::PayloadOptions;
use crate::core::record::InputRecord;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

pub const TAGS: &str = "tags";

#[derive(Debug, Deserialize)]
struct TagsSettings {
    column: String,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_separator() -> String {
    ",".to_string()
}

fn parse_settings(settings: &Value) -> Result<TagsSettings, PluginError> {
    let parsed: TagsSettings = serde_json::from_value(settings.clone())
        .map_err(|e| PluginError::invalid_settings(TAGS, e.to_string()))?;
    if parsed.separator.is_empty() {
        return Err(PluginError::invalid_settings(
            TAGS,
            "separator must not be empty",
        ));
    }
    Ok(parsed)
}

/// Splits one column into asset tags, appending to any tags already present
#[derive(Debug, Default)]
pub struct TagsPlugin;

#[async_trait]
impl Plugin for TagsPlugin {
    fn name(&self) -> &str {
        TAGS
    }

    async fn initialize(&self) -> Result<(), PluginError> {
        Ok(())
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
        let settings = parse_settings(settings)?;
        if !record.contains(&settings.column) {
            return Err(PluginError::MissingColumn {
                plugin: TAGS.to_string(),
                column: settings.column,
            });
        }

        let mut added = Vec::new();
        if let Some(raw) = record.get_trimmed(&settings.column) {
            for tag in raw.split(settings.separator.as_str()).map(str::trim) {
                if !tag.is_empty() && !options.tags.iter().any(|t| t == tag) {
                    options.tags.push(tag.to_string());
                    added.push(tag.to_string());
                }
            }
        }

        Ok(json!({ "tags_added": added }))
    }
}
