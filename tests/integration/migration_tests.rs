//! Migration runs against the in-process remote

#[cfg(test)]
mod tests {
    use crate::common::{CsvFixture, MockRemote, config_for, schema_source};
    use asset_migrate::core::payload::MetadataValue;
    use asset_migrate::utils::error::ErrorCategory;
    use asset_migrate::{
        LogEntry, MemoryRecorder, Migration, MigrationContext, MigrationError, OutcomeRecord,
        OutcomeStatus,
    };
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    fn context(
        config: asset_migrate::Config,
        remote: Arc<MockRemote>,
    ) -> (MigrationContext, Arc<MemoryRecorder>) {
        let recorder = Arc::new(MemoryRecorder::new());
        let context = MigrationContext::new(config, recorder.clone(), remote, schema_source());
        (context, recorder)
    }

    fn outcome_for(outcomes: &[OutcomeRecord], row: u64) -> &OutcomeRecord {
        outcomes
            .iter()
            .find(|o| o.record.row() == row)
            .unwrap_or_else(|| panic!("no outcome for row {row}"))
    }

    #[tokio::test]
    async fn test_full_run_records_every_row() {
        let csv = CsvFixture::assets();
        let remote = Arc::new(MockRemote::new());
        let config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        let (context, recorder) = context(config, remote.clone());

        let migration = Migration::prepare(context).await.unwrap();
        let stats = migration.run().await.unwrap();

        assert_eq!(stats.attempted, 5);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 3);
        assert_eq!(stats.in_flight, 0);

        let entries = recorder.entries();
        assert_eq!(entries.len(), 7);
        match entries.first() {
            Some(LogEntry::RunStarted { run_id, concurrency, .. }) => {
                assert_eq!(*run_id, migration.run_id());
                assert_eq!(*concurrency, 3);
            }
            other => panic!("unexpected first entry: {other:?}"),
        }
        match entries.last() {
            Some(LogEntry::RunCompleted { statistics, .. }) => {
                assert_eq!(statistics.attempted, 5);
            }
            other => panic!("unexpected last entry: {other:?}"),
        }

        // Only rows that built a payload reach the remote
        assert_eq!(remote.received().len(), 2);
    }

    #[tokio::test]
    async fn test_mapped_metadata_and_failure_codes() {
        let csv = CsvFixture::assets();
        let remote = Arc::new(MockRemote::new());
        let config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        let (context, recorder) = context(config, remote);

        Migration::prepare(context).await.unwrap().run().await.unwrap();
        let outcomes = recorder.outcomes();

        let first = outcome_for(&outcomes, 1);
        assert_eq!(first.status, OutcomeStatus::Succeeded);
        let payload = first.payload.as_ref().unwrap();
        assert_eq!(payload.locator().name.as_deref(), Some("a"));
        assert_eq!(payload.options().tags, vec!["x", "y"]);
        assert_eq!(
            payload.request_body()["metadata"],
            json!({
                "smd_ssl": "ssl_b",
                "smd_msl": ["msl_option_c", "msl_option_a"],
                "smd_shot_date": "2024-12-25",
                "smd_caption": "Hello"
            })
        );
        assert_eq!(payload.request_body()["overwrite"], json!(false));
        assert_eq!(first.response.as_ref().unwrap()["public_id"], json!("a"));

        let unknown_option = outcome_for(&outcomes, 2);
        assert_eq!(unknown_option.status, OutcomeStatus::Failed);
        assert!(unknown_option.payload.is_none());
        let error = unknown_option.error.as_ref().unwrap();
        assert_eq!(error.code, "mapping.invalid_option");
        assert_eq!(error.category, ErrorCategory::Data);
        assert!(error.render().contains("SSL Option Z"));

        let no_locator = outcome_for(&outcomes, 3);
        assert_eq!(
            no_locator.error.as_ref().unwrap().code,
            "payload.missing_locator"
        );

        let bad_date = outcome_for(&outcomes, 4);
        let error = bad_date.error.as_ref().unwrap();
        assert_eq!(error.code, "mapping.invalid_value");
        assert!(error.render().contains("20241225-123042"));

        // Identifiers resolve as well as labels
        let by_id = outcome_for(&outcomes, 5);
        assert!(by_id.is_success());
        assert_eq!(
            by_id.payload.as_ref().unwrap().options().metadata_value("smd_ssl"),
            Some(&MetadataValue::from("ssl_a"))
        );
    }

    #[tokio::test]
    async fn test_unknown_plugin_fails_before_any_record() {
        let csv = CsvFixture::assets();
        let remote = Arc::new(MockRemote::new());
        let mut config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        config.migration.plugins[0].name = "watermark".to_string();
        let (context, recorder) = context(config, remote.clone());

        let result = Migration::prepare(context).await;

        assert!(matches!(result, Err(MigrationError::Plugin(_))));
        assert!(recorder.entries().is_empty());
        assert!(remote.received().is_empty());
    }

    #[tokio::test]
    async fn test_reserved_upload_key_fails_before_any_record() {
        let csv = CsvFixture::assets();
        let remote = Arc::new(MockRemote::new());
        let mut config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        config
            .migration
            .upload
            .insert("tags".to_string(), json!(["archive"]));
        assert!(config.validate().is_err());
        let (context, recorder) = context(config, remote.clone());

        let result = Migration::prepare(context).await;

        assert!(matches!(result, Err(MigrationError::Config(_))));
        assert!(recorder.entries().is_empty());
        assert!(remote.received().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_target_fails_every_row() {
        let csv = CsvFixture::assets();
        let remote = Arc::new(MockRemote::new());
        let mut config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        config.migration.plugins[1].settings = json!({
            "mapping": {"SMD SSL": "smd_ssl", "Caption": "smd_ssl"}
        });
        let (context, recorder) = context(config, remote.clone());

        let stats = Migration::prepare(context).await.unwrap().run().await.unwrap();

        assert_eq!(stats.attempted, 5);
        assert_eq!(stats.failed, 5);
        assert!(remote.received().is_empty());
        for outcome in recorder.outcomes() {
            let error = outcome.error.as_ref().unwrap();
            // The missing locator is detected before any plugin runs
            if outcome.record.row() == 3 {
                assert_eq!(error.code, "payload.missing_locator");
                continue;
            }
            assert_eq!(error.code, "mapping.duplicate_target");
            assert_eq!(error.category, ErrorCategory::Configuration);
        }
    }

    #[tokio::test]
    async fn test_rejected_call_is_recorded() {
        let csv = CsvFixture::new(
            "File URL,Public ID,Tags,SMD SSL,SMD MSL,Shot Date,Caption\n\
             https://cdn.example.com/reject-me.jpg,r,,,,,\n",
        );
        let remote = Arc::new(MockRemote::new());
        let config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        let (context, recorder) = context(config, remote);

        let stats = Migration::prepare(context).await.unwrap().run().await.unwrap();
        assert_eq!(stats.failed, 1);

        let outcomes = recorder.outcomes();
        let rejected = outcome_for(&outcomes, 1);
        let error = rejected.error.as_ref().unwrap();
        assert_eq!(error.code, "operation.rejected");
        assert_eq!(error.category, ErrorCategory::Remote);
        assert!(error.message.contains("Invalid image file"));
        // The payload that was sent and the remote's answer are both kept
        assert!(rejected.payload.is_some());
        assert_eq!(
            rejected.response.as_ref().unwrap()["error"]["message"],
            json!("Invalid image file")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded_by_config() {
        let csv = CsvFixture::numbered(30);
        let remote = Arc::new(MockRemote::with_delay(Duration::from_millis(10)));
        let mut config = config_for("http://unused", csv.path(), Path::new("unused.jsonl"));
        config.migration.source.name_column = None;
        config.migration.plugins.clear();
        config.migration.run.concurrency = 4;
        let (context, recorder) = context(config, remote.clone());

        let stats = Migration::prepare(context).await.unwrap().run().await.unwrap();

        assert_eq!(stats.attempted, 30);
        assert_eq!(stats.succeeded, 30);
        assert!(remote.peak() <= 4);
        assert!(stats.peak_in_flight <= 4);
        assert_eq!(recorder.outcomes().len(), 30);
    }
}
