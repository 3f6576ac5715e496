//! Ephemeral key-value cache with per-entry expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

/// Shared ephemeral cache. Entries survive only within one process and
/// only until their TTL elapses.
#[async_trait]
pub trait EphemeralCache: Send + Sync {
    /// Stores a value under `key` for `ttl`.
    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Returns the value for `key` if present and unexpired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Drops the value for `key`, if any.
    async fn remove(&self, key: &str);
}

/// Process-local cache backed by a map with lazy expiry.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralCache for InMemoryCache {
    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value, deadline));
    }

    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_get_roundtrip() {
        let cache = InMemoryCache::new();
        cache.put("k", json!({"a": 1}), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!({"a": 1})));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = InMemoryCache::new();
        cache.put("k", json!(1), Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn remove_drops_entry() {
        let cache = InMemoryCache::new();
        cache.put("k", json!(1), Duration::from_secs(60)).await;
        cache.remove("k").await;
        assert_eq!(cache.get("k").await, None);
    }
}
