//! Configuration data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Default remote call timeout in seconds
pub fn default_timeout() -> u64 {
    60
}

/// Default number of records processed at once
pub fn default_concurrency() -> usize {
    10
}

/// Default capacity of the reader-to-engine channel
pub fn default_queue_capacity() -> usize {
    256
}

pub fn default_log_file() -> PathBuf {
    PathBuf::from("migration-log.jsonl")
}

pub fn default_upload_path() -> String {
    "upload".to_string()
}

pub fn default_schema_path() -> String {
    "metadata_fields".to_string()
}

pub fn default_delimiter() -> char {
    ','
}

pub fn default_locator_column() -> String {
    "url".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root, e.g. `https://api.example.com/v1/acme`
    #[serde(default)]
    pub base_url: String,
    /// Bearer token; usually supplied through `MIGRATE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Create/update endpoint, relative to `base_url`
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// Field schema endpoint, relative to `base_url`
    #[serde(default = "default_schema_path")]
    pub schema_path: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: default_timeout(),
            upload_path: default_upload_path(),
            schema_path: default_schema_path(),
        }
    }
}

/// Execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Durable JSONL audit log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            log_file: default_log_file(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Input CSV settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Column holding the asset URL or path
    #[serde(default = "default_locator_column")]
    pub locator_column: String,
    /// Column holding the remote asset name, if any
    #[serde(default)]
    pub name_column: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            delimiter: default_delimiter(),
            locator_column: default_locator_column(),
            name_column: None,
        }
    }
}

/// One enrichment step, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub source: SourceConfig,
    /// Static parameters sent with every create/update call
    #[serde(default)]
    pub upload: Map<String, Value>,
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}
