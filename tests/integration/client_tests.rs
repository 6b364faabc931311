//! HTTP client tests against a `wiremock` server

#[cfg(test)]
mod tests {
    use crate::common::fixtures::SCHEMA_JSON;
    use crate::common::{CsvFixture, config_for};
    use asset_migrate::config::RemoteConfig;
    use asset_migrate::core::payload::{LocatorColumns, Payload, PayloadBuilder};
    use asset_migrate::core::remote::{FailureReason, RemoteOutcome};
    use asset_migrate::core::schema::{InitializationError, SchemaSource};
    use asset_migrate::{
        ApiClient, InputRecord, Migration, MigrationContext, RemoteOperation, ReportGenerator,
    };
    use serde_json::{Map, json};
    use std::time::Duration;
    use tempfile::tempdir;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, timeout_secs: u64) -> ApiClient {
        ApiClient::new(&RemoteConfig {
            base_url: format!("{}/", server.uri()),
            api_key: Some("test-key".to_string()),
            timeout_secs,
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    fn payload() -> Payload {
        let mut params = Map::new();
        params.insert("overwrite".to_string(), json!(true));
        let builder = PayloadBuilder::new(
            LocatorColumns {
                uri: "url".to_string(),
                name: Some("id".to_string()),
            },
            params,
        );
        let record = InputRecord::from_pairs(1, [("url", "https://cdn.example.com/a.jpg"), ("id", "a")]);
        builder.build(&record).unwrap().payload
    }

    async fn respond_to_upload(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_upload_sends_authorized_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({
                "file": "https://cdn.example.com/a.jpg",
                "public_id": "a",
                "overwrite": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "public_id": "a",
                "overwritten": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, 5).invoke(&payload()).await.unwrap();

        assert_eq!(response.outcome, RemoteOutcome::Overwritten);
        assert_eq!(response.body["public_id"], json!("a"));
    }

    #[tokio::test]
    async fn test_response_flags_classify_outcome() {
        let server = MockServer::start().await;
        respond_to_upload(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"public_id": "a", "existing": true})),
        )
        .await;

        let response = client(&server, 5).invoke(&payload()).await.unwrap();
        assert_eq!(response.outcome, RemoteOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_rejection_carries_remote_message() {
        let server = MockServer::start().await;
        respond_to_upload(
            &server,
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": {"message": "Invalid image file"}})),
        )
        .await;

        let err = client(&server, 5).invoke(&payload()).await.unwrap_err();

        assert_eq!(err.reason, FailureReason::Rejected);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "Invalid image file");
        assert!(err.response.is_some());
        assert_eq!(err.outcome(), None);
    }

    #[tokio::test]
    async fn test_conflict_is_already_exists() {
        let server = MockServer::start().await;
        respond_to_upload(&server, ResponseTemplate::new(409)).await;

        let err = client(&server, 5).invoke(&payload()).await.unwrap_err();

        assert_eq!(err.status, Some(409));
        assert_eq!(err.outcome(), Some(RemoteOutcome::AlreadyExists));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        respond_to_upload(&server, ResponseTemplate::new(503)).await;

        let err = client(&server, 5).invoke(&payload()).await.unwrap_err();

        assert_eq!(err.reason, FailureReason::Unavailable);
        assert_eq!(err.message, "HTTP status 503");
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        respond_to_upload(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"public_id": "a"}))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let err = client(&server, 1).invoke(&payload()).await.unwrap_err();
        assert_eq!(err.reason, FailureReason::Timeout);
    }

    #[tokio::test]
    async fn test_non_json_success_is_invalid_response() {
        let server = MockServer::start().await;
        respond_to_upload(&server, ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .await;

        let err = client(&server, 5).invoke(&payload()).await.unwrap_err();
        assert_eq!(err.reason, FailureReason::InvalidResponse);
    }

    #[tokio::test]
    async fn test_schema_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata_fields"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SCHEMA_JSON, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let fields = client(&server, 5).fetch_fields().await.unwrap();

        assert_eq!(fields.len(), 4);
        assert!(fields.iter().any(|f| f.id == "smd_msl" && f.options().len() == 3));
    }

    #[tokio::test]
    async fn test_schema_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata_fields"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, 5).fetch_fields().await.unwrap_err();
        assert!(matches!(err, InitializationError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_end_to_end_run_and_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metadata_fields"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SCHEMA_JSON, "application/json"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"public_id": "ok"})))
            .expect(2)
            .mount(&server)
            .await;

        let csv = CsvFixture::assets();
        let dir = tempdir().unwrap();
        let log = dir.path().join("logs").join("run.jsonl");
        let config = config_for(&server.uri(), csv.path(), &log);

        let context = MigrationContext::from_config(config).await.unwrap();
        let migration = Migration::prepare(context).await.unwrap();
        let stats = migration.run().await.unwrap();
        assert_eq!((stats.succeeded, stats.failed), (2, 3));

        let report = dir.path().join("report.csv");
        let summary = ReportGenerator::new().generate(&log, &report).unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 3);
        // run_started and run_completed
        assert_eq!(summary.skipped, 2);
    }
}
