//! Configuration management for the migration runner
//!
//! Configuration is layered: YAML file, then environment variables (a `.env`
//! file is honoured), then command-line overrides applied by the binary.
//! [`Config::validate`] runs last.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{MigrationError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variables read by [`Config::apply_env`]
pub const ENV_BASE_URL: &str = "MIGRATE_API_BASE_URL";
pub const ENV_API_KEY: &str = "MIGRATE_API_KEY";
pub const ENV_CONCURRENCY: &str = "MIGRATE_CONCURRENCY";
pub const ENV_TIMEOUT_SECS: &str = "MIGRATE_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "MIGRATE_LOG_FILE";
pub const ENV_LOG_LEVEL: &str = "MIGRATE_LOG_LEVEL";

/// Main configuration struct
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub migration: MigrationConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            MigrationError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let migration: MigrationConfig = serde_yaml::from_str(content)
            .map_err(|e| MigrationError::config(format!("Failed to parse config: {}", e)))?;
        Ok(Self { migration })
    }

    /// Overlay values from the process environment (and `.env`, if present)
    pub fn apply_process_env(&mut self) -> Result<()> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let m = &mut self.migration;

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            m.remote.base_url = base_url;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            m.remote.api_key = Some(api_key);
        }
        if let Some(concurrency) = lookup(ENV_CONCURRENCY) {
            m.run.concurrency = concurrency.parse().map_err(|e| {
                MigrationError::config(format!("Invalid {}: {}", ENV_CONCURRENCY, e))
            })?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            m.remote.timeout_secs = timeout.parse().map_err(|e| {
                MigrationError::config(format!("Invalid {}: {}", ENV_TIMEOUT_SECS, e))
            })?;
        }
        if let Some(log_file) = lookup(ENV_LOG_FILE) {
            m.run.log_file = PathBuf::from(log_file);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            m.logging.level = level;
        }

        Ok(())
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.migration.remote
    }

    pub fn run(&self) -> &RunConfig {
        &self.migration.run
    }

    pub fn source(&self) -> &SourceConfig {
        &self.migration.source
    }

    pub fn plugins(&self) -> &[PluginConfig] {
        &self.migration.plugins
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.migration.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.migration
            .remote
            .validate()
            .map_err(|e| MigrationError::config(format!("Remote config error: {}", e)))?;
        self.migration
            .run
            .validate()
            .map_err(|e| MigrationError::config(format!("Run config error: {}", e)))?;
        self.migration
            .source
            .validate()
            .map_err(|e| MigrationError::config(format!("Source config error: {}", e)))?;
        self.migration
            .upload
            .validate()
            .map_err(|e| MigrationError::config(format!("Upload config error: {}", e)))?;
        self.migration
            .plugins
            .validate()
            .map_err(|e| MigrationError::config(format!("Plugin config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}
