//! Plain HTTP push sink.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::sink::{CatalogSink, SinkError};

/// Posts snapshots to an external endpoint as a `{fileName, data}`
/// envelope.
pub struct JsonPostSink {
    name: String,
    client: reqwest::Client,
    endpoint: String,
}

impl JsonPostSink {
    pub fn new(name: impl Into<String>, client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CatalogSink for JsonPostSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(&self, name: &str, payload: &Value) -> Result<(), SinkError> {
        let envelope = json!({
            "fileName": name,
            "data": payload,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| SinkError::new(format!("post to {}: {e}", self.endpoint)))?;

        if !response.status().is_success() {
            return Err(SinkError::new(format!(
                "endpoint {} answered {}",
                self.endpoint,
                response.status()
            )));
        }
        Ok(())
    }
}
