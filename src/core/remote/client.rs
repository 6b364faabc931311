//! HTTP client for the asset API

use super::{OperationError, OperationResponse, RemoteOperation};
use crate::config::RemoteConfig;
use crate::core::payload::Payload;
use crate::core::schema::{FieldSchema, InitializationError, SchemaSource};
use crate::utils::error::{MigrationError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Asset API client: create/update calls and the field schema endpoint
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    upload_path: String,
    schema_path: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MigrationError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            upload_path: config.upload_path.trim_start_matches('/').to_string(),
            schema_path: config.schema_path.trim_start_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn classify_transport(&self, error: reqwest::Error) -> OperationError {
        if error.is_timeout() {
            OperationError::timeout(self.timeout)
        } else {
            OperationError::network(error.to_string())
        }
    }
}

#[async_trait]
impl RemoteOperation for ApiClient {
    async fn invoke(&self, payload: &Payload) -> std::result::Result<OperationResponse, OperationError> {
        let url = self.endpoint(&self.upload_path);
        debug!("POST {} for {}", url, payload.locator().uri);

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload.request_body())
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).ok();
            return Err(OperationError::from_status(status.as_u16(), body));
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| OperationError::invalid_response(format!("Response is not JSON: {}", e)))?;
        Ok(OperationResponse::from_body(body))
    }
}

#[async_trait]
impl SchemaSource for ApiClient {
    async fn fetch_fields(&self) -> std::result::Result<Vec<FieldSchema>, InitializationError> {
        let url = self.endpoint(&self.schema_path);
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| InitializationError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InitializationError::Fetch(format!(
                "{} returned HTTP status {}",
                url, status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| InitializationError::Fetch(e.to_string()))?;
        Ok(crate::core::schema::decode_fields_value(body)?)
    }
}
