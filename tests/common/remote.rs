//! In-process remote operation

use asset_migrate::core::payload::Payload;
use asset_migrate::core::remote::{OperationError, OperationResponse, RemoteOperation};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Accepts every payload, except locators containing `reject`, and keeps
/// what it was sent
#[derive(Default)]
pub struct MockRemote {
    received: Mutex<Vec<Payload>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn received(&self) -> Vec<Payload> {
        self.received.lock().unwrap().clone()
    }

    /// Highest number of simultaneous `invoke` calls seen
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteOperation for MockRemote {
    async fn invoke(&self, payload: &Payload) -> Result<OperationResponse, OperationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.received.lock().unwrap().push(payload.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if payload.locator().uri.contains("reject") {
            return Err(OperationError::from_status(
                400,
                Some(json!({"error": {"message": "Invalid image file"}})),
            ));
        }
        Ok(OperationResponse::from_body(json!({
            "public_id": payload.locator().name,
            "secure_url": payload.locator().uri,
        })))
    }
}
