//! Test fixtures and factories

use asset_migrate::Config;
use asset_migrate::config::{PluginConfig, RemoteConfig, RunConfig, SourceConfig};
use asset_migrate::core::schema::{SchemaSource, StaticSchemaSource};
use serde_json::{Map, json};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Field schema in the remote wire format
pub const SCHEMA_JSON: &str = r#"{
  "metadata_fields": [
    {"external_id": "smd_ssl", "label": "SMD SSL", "type": "enum",
     "datasource": {"values": [
       {"external_id": "ssl_a", "value": "SSL Option A"},
       {"external_id": "ssl_b", "value": "SSL Option B"},
       {"external_id": "ssl_old", "value": "SSL Option Old", "state": "inactive"}
     ]}},
    {"external_id": "smd_msl", "label": "SMD MSL", "type": "set",
     "datasource": {"values": [
       {"external_id": "msl_option_a", "value": "MSL Option A"},
       {"external_id": "msl_option_b", "value": "MSL Option B"},
       {"external_id": "msl_option_c", "value": "MSL Option C"}
     ]}},
    {"external_id": "smd_shot_date", "label": "Shot Date", "type": "date"},
    {"external_id": "smd_caption", "label": "Caption", "type": "string"}
  ]
}"#;

/// Five rows: two clean, one unknown option, one without a locator, one bad date
pub const ASSETS_CSV: &str = "\
File URL,Public ID,Tags,SMD SSL,SMD MSL,Shot Date,Caption
https://cdn.example.com/a.jpg,a,x;y,SSL Option B,\"MSL Option C, MSL Option A\",2024/12/25 12:30:42,Hello
https://cdn.example.com/b.jpg,b,,SSL Option Z,,,
,c,,,,,
https://cdn.example.com/d.jpg,d,,,,20241225-123042,
https://cdn.example.com/e.jpg,e,,ssl_a,,,
";

pub fn schema_source() -> Arc<dyn SchemaSource> {
    Arc::new(StaticSchemaSource::from_json(SCHEMA_JSON).expect("fixture schema parses"))
}

/// A CSV file that lives as long as the fixture
pub struct CsvFixture {
    file: NamedTempFile,
}

impl CsvFixture {
    pub fn new(content: &str) -> Self {
        let mut file = NamedTempFile::new().expect("create temp csv");
        file.write_all(content.as_bytes()).expect("write temp csv");
        file.flush().expect("flush temp csv");
        Self { file }
    }

    pub fn assets() -> Self {
        Self::new(ASSETS_CSV)
    }

    /// `count` rows with only a locator column
    pub fn numbered(count: usize) -> Self {
        let mut content = String::from("File URL\n");
        for i in 1..=count {
            content.push_str(&format!("https://cdn.example.com/{i}.jpg\n"));
        }
        Self::new(&content)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Configuration with the tags and structured metadata steps
pub fn config_for(base_url: &str, source: &Path, log_file: &Path) -> Config {
    let mut config = Config::default();
    let m = &mut config.migration;

    m.remote = RemoteConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        ..RemoteConfig::default()
    };
    m.run = RunConfig {
        concurrency: 3,
        log_file: log_file.to_path_buf(),
        ..RunConfig::default()
    };
    m.source = SourceConfig {
        path: source.to_path_buf(),
        locator_column: "File URL".to_string(),
        name_column: Some("Public ID".to_string()),
        ..SourceConfig::default()
    };

    let mut upload = Map::new();
    upload.insert("overwrite".to_string(), json!(false));
    m.upload = upload;

    m.plugins = vec![
        PluginConfig {
            name: "tags".to_string(),
            settings: json!({"column": "Tags", "separator": ";"}),
        },
        PluginConfig {
            name: "structured_metadata".to_string(),
            settings: json!({
                "mapping": {
                    "SMD SSL": "smd_ssl",
                    "SMD MSL": "smd_msl",
                    "Shot Date": "smd_shot_date",
                    "Caption": "smd_caption"
                }
            }),
        },
    ];

    config
}
