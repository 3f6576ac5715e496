//! Catalog sink abstraction.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

/// Upload failure for one sink; captured in the publish report, not
/// propagated as a pipeline error unless the sink is primary.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SinkError {}

/// One publish destination for a catalog snapshot.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    /// Stable sink name used in reports and logs.
    fn name(&self) -> &str;

    /// Uploads one snapshot under `name`. Called at most once per cycle.
    async fn upload(&self, name: &str, payload: &Value) -> std::result::Result<(), SinkError>;
}

/// Recording sink: keeps every upload in memory and can be told to fail.
/// Useful as a test double and for dry-run publishing.
#[derive(Default)]
pub struct MemorySink {
    name: String,
    uploads: Mutex<Vec<(String, Value)>>,
    fail: AtomicBool,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uploads: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent upload fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().map(|u| u.len()).unwrap_or(0)
    }

    /// Last uploaded (name, payload) pair, if any.
    pub fn last_upload(&self) -> Option<(String, Value)> {
        self.uploads
            .lock()
            .ok()
            .and_then(|u| u.last().cloned())
    }
}

#[async_trait]
impl CatalogSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(&self, name: &str, payload: &Value) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::new("simulated sink failure"));
        }
        match self.uploads.lock() {
            Ok(mut uploads) => {
                uploads.push((name.to_string(), payload.clone()));
                Ok(())
            }
            Err(_) => Err(SinkError::new("sink state poisoned")),
        }
    }
}
