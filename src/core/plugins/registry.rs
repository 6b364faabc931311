//! Plugin Registry
//!
//! Name-keyed table of plugins. Every plugin is initialized exactly once, and
//! lookups are only served after that.

use super::{Plugin, PluginError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    initialized: bool,
}

impl PluginRegistry {
    /// Create new plugin registry
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            initialized: false,
        }
    }

    /// Register a plugin under its own name
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(PluginError::Duplicate(name));
        }
        self.plugins.insert(name, plugin);
        // A new plugin has not been initialized yet
        self.initialized = false;
        Ok(())
    }

    /// Initialize every registered plugin. Plugins keep their own
    /// once-only guards, so calling this again does not redo their setup.
    pub async fn initialize_all(&mut self) -> Result<(), PluginError> {
        let mut names: Vec<&String> = self.plugins.keys().collect();
        names.sort();

        for name in names {
            info!(plugin = %name, "Initializing plugin");
            self.plugins[name].initialize().await?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Get an initialized plugin by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Plugin>, PluginError> {
        if !self.initialized {
            return Err(PluginError::RegistryNotInitialized);
        }
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// List all registered plugin names
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.list())
            .field("initialized", &self.initialized)
            .finish()
    }
}
