//! Durable blob sink: the primary publish destination.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::sink::{CatalogSink, SinkError};

/// Writes snapshots as files under a directory, overwriting by name so an
/// existing external reference to the blob keeps resolving.
pub struct FileBlobSink {
    root: PathBuf,
}

impl FileBlobSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a snapshot name maps to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl CatalogSink for FileBlobSink {
    fn name(&self) -> &str {
        "blob"
    }

    async fn upload(&self, name: &str, payload: &Value) -> Result<(), SinkError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| SinkError::new(format!("serialize snapshot: {e}")))?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SinkError::new(format!("create blob directory: {e}")))?;
        tokio::fs::write(self.path_for(name), bytes)
            .await
            .map_err(|e| SinkError::new(format!("write blob {name}: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_and_overwrites_by_name() {
        let dir = std::env::temp_dir().join(format!("blob-sink-{}", std::process::id()));
        let sink = FileBlobSink::new(&dir);

        sink.upload("catalogo.json", &json!({"v": 1})).await.unwrap();
        sink.upload("catalogo.json", &json!({"v": 2})).await.unwrap();

        let content = tokio::fs::read_to_string(sink.path_for("catalogo.json"))
            .await
            .unwrap();
        assert_eq!(content, r#"{"v":2}"#);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
