//! Report generation from a durable run log

#[cfg(test)]
mod tests {
    use crate::common::{CsvFixture, MockRemote, config_for, schema_source};
    use asset_migrate::core::report::STATUS_COLUMNS;
    use asset_migrate::{JsonlRecorder, Migration, MigrationContext, ReportGenerator};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_report_from_jsonl_run_log() {
        let csv = CsvFixture::assets();
        let dir = tempdir().unwrap();
        let log = dir.path().join("run.jsonl");
        let config = config_for("http://unused", csv.path(), &log);

        let recorder = Arc::new(JsonlRecorder::open(&log).await.unwrap());
        let context = MigrationContext::new(
            config,
            recorder,
            Arc::new(MockRemote::new()),
            schema_source(),
        );
        Migration::prepare(context).await.unwrap().run().await.unwrap();

        let output = dir.path().join("report.csv");
        let summary = ReportGenerator::new().generate(&log, &output).unwrap();
        assert_eq!(summary.rows, 5);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(&headers[..7], &[
            "File URL", "Public ID", "Tags", "SMD SSL", "SMD MSL", "Shot Date", "Caption"
        ]);
        assert_eq!(&headers[7..], &STATUS_COLUMNS);

        // Outcomes complete in any order, so index rows by their row number
        let rows: HashMap<String, HashMap<String, String>> = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                let row: HashMap<String, String> = headers
                    .iter()
                    .cloned()
                    .zip(r.iter().map(String::from))
                    .collect();
                (row["migration_row"].clone(), row)
            })
            .collect();
        assert_eq!(rows.len(), 5);

        let first = &rows["1"];
        assert_eq!(first["Public ID"], "a");
        assert_eq!(first["migration_status"], "SUCCEEDED");
        assert_eq!(first["migration_outcome"], "created");
        assert_eq!(first["migration_error_code"], "");

        let second = &rows["2"];
        assert_eq!(second["migration_status"], "FAILED");
        assert_eq!(second["migration_error_code"], "mapping.invalid_option");
        assert!(second["migration_error"].contains("SSL Option Z"));

        assert_eq!(rows["3"]["migration_error_code"], "payload.missing_locator");
        assert_eq!(rows["4"]["migration_error_code"], "mapping.invalid_value");
    }

    #[tokio::test]
    async fn test_report_covers_appended_runs() {
        let csv = CsvFixture::numbered(3);
        let dir = tempdir().unwrap();
        let log = dir.path().join("run.jsonl");

        for _ in 0..2 {
            let mut config = config_for("http://unused", csv.path(), &log);
            config.migration.source.name_column = None;
            config.migration.plugins.clear();
            let recorder = Arc::new(JsonlRecorder::open(&log).await.unwrap());
            let context = MigrationContext::new(
                config,
                recorder,
                Arc::new(MockRemote::new()),
                schema_source(),
            );
            Migration::prepare(context).await.unwrap().run().await.unwrap();
        }

        let summary = ReportGenerator::new()
            .generate(&log, dir.path().join("report.csv"))
            .unwrap();
        assert_eq!(summary.rows, 6);
        assert_eq!(summary.succeeded, 6);
        assert_eq!(summary.skipped, 4);
    }
}
