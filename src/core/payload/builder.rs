//! Payload construction
//!
//! Reads the asset locator from the record, seeds the options with the static
//! upload parameters, then runs each configured plugin in order.

use super::types::{AssetLocator, BuiltPayload, Payload, PayloadOptions, PluginTrace};
use crate::core::plugins::{Plugin, PluginError, PluginRegistry};
use crate::core::record::InputRecord;
use crate::utils::error::{ErrorCategory, ErrorClassification};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Payload construction failed for one record
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("Record has no value in locator column '{column}'")]
    MissingLocator { column: String },

    #[error("Plugin '{plugin}' failed")]
    Step {
        plugin: String,
        #[source]
        source: PluginError,
        /// Traces of the steps that completed before the failure
        traces: Vec<PluginTrace>,
    },
}

impl ConstructionError {
    /// Traces gathered before the failure, for diagnostics
    pub fn traces(&self) -> &[PluginTrace] {
        match self {
            Self::MissingLocator { .. } => &[],
            Self::Step { traces, .. } => traces,
        }
    }
}

impl ErrorClassification for ConstructionError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingLocator { .. } => "payload.missing_locator",
            Self::Step { source, .. } => source.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingLocator { .. } => ErrorCategory::Data,
            Self::Step { source, .. } => source.category(),
        }
    }
}

/// Which columns identify the asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorColumns {
    pub uri: String,
    pub name: Option<String>,
}

struct BuildStep {
    name: String,
    plugin: Arc<dyn Plugin>,
    settings: Value,
}

pub struct PayloadBuilder {
    locator: LocatorColumns,
    params: Map<String, Value>,
    steps: Vec<BuildStep>,
}

impl PayloadBuilder {
    pub fn new(locator: LocatorColumns, params: Map<String, Value>) -> Self {
        Self {
            locator,
            params,
            steps: Vec::new(),
        }
    }

    /// Append a plugin step. The plugin must already be initialized in `registry`.
    pub fn with_step(
        mut self,
        registry: &PluginRegistry,
        name: &str,
        settings: Value,
    ) -> Result<Self, PluginError> {
        let plugin = registry.lookup(name)?;
        plugin.validate_settings(&settings)?;
        self.steps.push(BuildStep {
            name: name.to_string(),
            plugin,
            settings,
        });
        Ok(self)
    }

    /// Step names in execution order
    pub fn steps(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    fn locate(&self, record: &InputRecord) -> Result<AssetLocator, ConstructionError> {
        let uri = record
            .get_trimmed(&self.locator.uri)
            .ok_or_else(|| ConstructionError::MissingLocator {
                column: self.locator.uri.clone(),
            })?;
        let name = self
            .locator
            .name
            .as_deref()
            .and_then(|column| record.get_trimmed(column))
            .map(str::to_string);

        Ok(AssetLocator {
            uri: uri.to_string(),
            name,
        })
    }

    /// Build the outbound payload for one record
    pub fn build(&self, record: &InputRecord) -> Result<BuiltPayload, ConstructionError> {
        let locator = self.locate(record)?;
        let mut options = PayloadOptions::with_params(self.params.clone());
        let mut traces = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            match step.plugin.process(&mut options, record, &step.settings) {
                Ok(trace) => traces.push(PluginTrace {
                    plugin: step.name.clone(),
                    trace,
                }),
                Err(source) => {
                    return Err(ConstructionError::Step {
                        plugin: step.name.clone(),
                        source,
                        traces,
                    });
                }
            }
        }

        Ok(BuiltPayload {
            payload: Payload::new(locator, options),
            traces,
        })
    }
}
