//! Cached view of per-variant stock levels.
//!
//! The cache is a best-effort mirror of the inventory table, never the
//! source of truth; divergence is resolved by the next rebuild or by the
//! deltas pushed after each sale. Writers serialize on the same lock as
//! sale processing; reads of a fresh cache never block.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::VariantKey;
use futures_util::StreamExt;
use records::{InventoryRow, tables};
use serde_json::Value;
use tablestore::{HeaderIndex, RetryPolicy, TableStore};
use tracing::warn;

use crate::cache::EphemeralCache;
use crate::error::{Result, SalesError};
use crate::lock::{LockGuard, ProcessLock};

/// Cache key the stock map lives under.
pub const STOCK_CACHE_KEY: &str = "stock:levels";

pub struct StockCache {
    store: Arc<dyn TableStore>,
    cache: Arc<dyn EphemeralCache>,
    lock: Arc<dyn ProcessLock>,
    retry: RetryPolicy,
    ttl: Duration,
    lock_timeout: Duration,
}

impl StockCache {
    pub fn new(
        store: Arc<dyn TableStore>,
        cache: Arc<dyn EphemeralCache>,
        lock: Arc<dyn ProcessLock>,
        ttl: Duration,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            lock,
            retry: RetryPolicy::default(),
            ttl,
            lock_timeout,
        }
    }

    /// Full scan of the inventory table into a fresh key-to-quantity map,
    /// stored with the configured TTL.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<HashMap<VariantKey, i64>> {
        let _guard = LockGuard::acquire(self.lock.clone(), self.lock_timeout)
            .await
            .ok_or(SalesError::Busy)?;
        self.rebuild_unlocked().await
    }

    /// Cached map if fresh, otherwise a transparent rebuild.
    pub async fn get(&self) -> Result<HashMap<VariantKey, i64>> {
        if let Some(value) = self.cache.get(STOCK_CACHE_KEY).await {
            return Ok(decode_levels(&value));
        }
        self.rebuild().await
    }

    /// Upserts absolute quantities into the cached map with a refreshed
    /// TTL. With nothing cached, falls back to a rebuild; a partial merge
    /// onto nothing would be meaningless.
    #[tracing::instrument(skip_all, fields(updates = updates.len()))]
    pub async fn apply_delta(
        &self,
        updates: &HashMap<VariantKey, i64>,
    ) -> Result<HashMap<VariantKey, i64>> {
        let _guard = LockGuard::acquire(self.lock.clone(), self.lock_timeout)
            .await
            .ok_or(SalesError::Busy)?;
        self.apply_delta_unlocked(updates).await
    }

    /// Rebuild body for callers already holding the process lock.
    pub(crate) async fn rebuild_unlocked(&self) -> Result<HashMap<VariantKey, i64>> {
        let header = self
            .retry
            .run(|| self.store.get_header(tables::INVENTORY))
            .await?;
        let index = HeaderIndex::build(tables::INVENTORY, &header);
        index.require_all(InventoryRow::REQUIRED)?;

        let mut levels: HashMap<VariantKey, i64> = HashMap::new();
        let mut rows = self
            .retry
            .run(|| self.store.stream_rows(tables::INVENTORY))
            .await?;
        while let Some(item) = rows.next().await {
            let (i, row) = item?;
            match InventoryRow::decode(&row, &index) {
                Ok(inv) => *levels.entry(inv.key).or_insert(0) += inv.stock,
                Err(err) => warn!(row = i, error = %err, "Skipping undecodable inventory row"),
            }
        }

        self.cache
            .put(STOCK_CACHE_KEY, encode_levels(&levels), self.ttl)
            .await;
        metrics::counter!("stock_cache_rebuilds_total").increment(1);
        Ok(levels)
    }

    /// Delta-merge body for callers already holding the process lock.
    pub(crate) async fn apply_delta_unlocked(
        &self,
        updates: &HashMap<VariantKey, i64>,
    ) -> Result<HashMap<VariantKey, i64>> {
        let Some(value) = self.cache.get(STOCK_CACHE_KEY).await else {
            return self.rebuild_unlocked().await;
        };

        let mut levels = decode_levels(&value);
        for (key, quantity) in updates {
            levels.insert(key.clone(), *quantity);
        }
        self.cache
            .put(STOCK_CACHE_KEY, encode_levels(&levels), self.ttl)
            .await;
        Ok(levels)
    }

    /// Drops the cached map; the next read rebuilds.
    pub async fn invalidate(&self) {
        self.cache.remove(STOCK_CACHE_KEY).await;
    }
}

fn encode_levels(levels: &HashMap<VariantKey, i64>) -> Value {
    let map: serde_json::Map<String, Value> = levels
        .iter()
        .map(|(key, quantity)| (key.cache_key(), Value::from(*quantity)))
        .collect();
    Value::Object(map)
}

fn decode_levels(value: &Value) -> HashMap<VariantKey, i64> {
    let Some(map) = value.as_object() else {
        return HashMap::new();
    };
    let mut levels = HashMap::with_capacity(map.len());
    for (raw, quantity) in map {
        match (VariantKey::from_cache_key(raw), quantity.as_i64()) {
            (Some(key), Some(quantity)) => {
                levels.insert(key, quantity);
            }
            _ => warn!(key = %raw, "Dropping malformed stock cache entry"),
        }
    }
    levels
}
