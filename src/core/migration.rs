//! Run wiring
//!
//! [`MigrationContext`] owns the collaborators of a run and is built once by
//! the entry point. [`Migration::prepare`] performs all fatal startup work
//! (plugin registration and initialization, schema fetch, pipeline
//! assembly) before any record is read.

use crate::config::{Config, Validate};
use crate::core::batch::{BatchConfig, BatchExecutor, RecordProcessor, RunStatistics};
use crate::core::payload::{LocatorColumns, PayloadBuilder};
use crate::core::plugins::{PluginRegistry, builtin_plugin};
use crate::core::record::InputRecord;
use crate::core::recorder::{JsonlRecorder, LogEntry, Recorder};
use crate::core::remote::{ApiClient, RemoteOperation};
use crate::core::schema::SchemaSource;
use crate::core::source::{CsvRecordSource, SourceError};
use crate::utils::error::{MigrationError, Result};
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Collaborators shared by every part of a run
#[derive(Clone)]
pub struct MigrationContext {
    pub config: Arc<Config>,
    pub recorder: Arc<dyn Recorder>,
    pub remote: Arc<dyn RemoteOperation>,
    pub schema_source: Arc<dyn SchemaSource>,
}

impl MigrationContext {
    pub fn new(
        config: Config,
        recorder: Arc<dyn Recorder>,
        remote: Arc<dyn RemoteOperation>,
        schema_source: Arc<dyn SchemaSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            recorder,
            remote,
            schema_source,
        }
    }

    /// Production wiring: HTTP client for both the schema and the remote
    /// operation, JSONL file for the run log
    pub async fn from_config(config: Config) -> Result<Self> {
        let client = Arc::new(ApiClient::new(config.remote())?);
        let recorder = Arc::new(JsonlRecorder::open(&config.run().log_file).await?);
        Ok(Self::new(config, recorder, client.clone(), client))
    }
}

/// A prepared run
pub struct Migration {
    context: MigrationContext,
    builder: Arc<PayloadBuilder>,
    run_id: Uuid,
}

impl Migration {
    pub async fn prepare(context: MigrationContext) -> Result<Self> {
        let config = Arc::clone(&context.config);
        config
            .migration
            .upload
            .validate()
            .map_err(|e| MigrationError::config(format!("Upload config error: {}", e)))?;

        let mut registry = PluginRegistry::new();
        for plugin in config.plugins() {
            registry.register(builtin_plugin(&plugin.name, &context.schema_source)?)?;
        }
        registry.initialize_all().await?;

        let source = config.source();
        let mut builder = PayloadBuilder::new(
            LocatorColumns {
                uri: source.locator_column.clone(),
                name: source.name_column.clone(),
            },
            config.migration.upload.clone(),
        );
        for plugin in config.plugins() {
            builder = builder.with_step(&registry, &plugin.name, plugin.settings.clone())?;
        }
        debug!(steps = ?builder.steps(), "Payload pipeline ready");

        Ok(Self {
            context,
            builder: Arc::new(builder),
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn context(&self) -> &MigrationContext {
        &self.context
    }

    /// Run over the configured CSV source
    pub async fn run(&self) -> Result<RunStatistics> {
        let config = &self.context.config;
        let source = config.source();
        let delimiter = u8::try_from(source.delimiter).map_err(|_| {
            MigrationError::config(format!("Delimiter '{}' is not a single byte", source.delimiter))
        })?;

        let records = CsvRecordSource::open(&source.path, delimiter, config.run().queue_capacity)?;
        debug!(columns = ?records.headers(), "Read source header");

        self.run_records(records.into_stream(), Some(source.path.display().to_string()))
            .await
    }

    /// Run over any record stream, framing the outcomes with run entries
    pub async fn run_records<S>(&self, records: S, source: Option<String>) -> Result<RunStatistics>
    where
        S: Stream<Item = std::result::Result<InputRecord, SourceError>> + Unpin,
    {
        let config = &self.context.config;
        let concurrency = config.run().concurrency;
        let recorder = &self.context.recorder;

        info!(run_id = %self.run_id, concurrency, "Starting migration run");
        recorder
            .append(&LogEntry::run_started(self.run_id, concurrency, source))
            .await?;

        let processor = RecordProcessor::new(
            Arc::clone(&self.builder),
            Arc::clone(&self.context.remote),
            Duration::from_secs(config.remote().timeout_secs),
        );
        let executor = BatchExecutor::new(
            BatchConfig::new().with_concurrency(concurrency),
            Arc::clone(recorder),
        );

        let statistics = executor
            .run(records, move |record| {
                let processor = processor.clone();
                async move { processor.process(record).await }
            })
            .await?;

        recorder
            .append(&LogEntry::run_completed(self.run_id, statistics.clone()))
            .await?;
        recorder.flush().await?;

        info!(
            run_id = %self.run_id,
            attempted = statistics.attempted,
            succeeded = statistics.succeeded,
            failed = statistics.failed,
            "Migration run completed"
        );
        Ok(statistics)
    }
}
