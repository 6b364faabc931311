//! Configuration loading

#[cfg(test)]
mod tests {
    use crate::common::{MockRemote, schema_source};
    use asset_migrate::{Config, MemoryRecorder, Migration, MigrationContext};
    use std::sync::Arc;

    const EXAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/migrate.yaml.example");

    #[tokio::test]
    async fn test_example_config_loads_and_validates() {
        let config = Config::from_file(EXAMPLE).await.unwrap();
        config.validate().unwrap();

        assert_eq!(config.run().concurrency, 10);
        assert_eq!(config.source().locator_column, "File URL");
        assert_eq!(config.remote().api_key, None);
        let names: Vec<&str> = config.plugins().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tags", "structured_metadata"]);
    }

    #[tokio::test]
    async fn test_example_config_prepares_pipeline() {
        let config = Config::from_file(EXAMPLE).await.unwrap();
        let context = MigrationContext::new(
            config,
            Arc::new(MemoryRecorder::new()),
            Arc::new(MockRemote::new()),
            schema_source(),
        );

        let migration = Migration::prepare(context).await.unwrap();
        assert_eq!(migration.context().config.plugins().len(), 2);
    }

    #[tokio::test]
    async fn test_env_overrides_file() {
        let mut config = Config::from_file(EXAMPLE).await.unwrap();
        config
            .apply_env(|key| match key {
                "MIGRATE_API_KEY" => Some("secret".to_string()),
                "MIGRATE_CONCURRENCY" => Some("2".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.remote().api_key.as_deref(), Some("secret"));
        assert_eq!(config.run().concurrency, 2);
        config.validate().unwrap();
    }
}
