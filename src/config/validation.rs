//! Configuration validation

use super::models::*;
use crate::core::payload::RESERVED_PARAMS;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for RemoteConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url is required".to_string());
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("invalid base_url '{}': {}", self.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("base_url must be http or https, got '{}'", url.scheme()));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be at least 1".to_string());
        }
        if self.log_file.as_os_str().is_empty() {
            return Err("log_file is required".to_string());
        }
        Ok(())
    }
}

impl Validate for SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("path is required".to_string());
        }
        if !self.delimiter.is_ascii() {
            return Err(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ));
        }
        if self.locator_column.trim().is_empty() {
            return Err("locator_column must not be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for Vec<PluginConfig> {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for plugin in self {
            if plugin.name.trim().is_empty() {
                return Err("plugin name must not be empty".to_string());
            }
            if !seen.insert(plugin.name.as_str()) {
                return Err(format!("plugin '{}' is listed more than once", plugin.name));
            }
        }
        Ok(())
    }
}

/// Static upload parameters
impl Validate for Map<String, Value> {
    fn validate(&self) -> Result<(), String> {
        if let Some(key) = RESERVED_PARAMS.iter().find(|key| self.contains_key(**key)) {
            return Err(format!(
                "'{}' is set from the record and plugins, not from upload parameters",
                key
            ));
        }
        Ok(())
    }
}
