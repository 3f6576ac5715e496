//! Point-of-sale transaction processing.
//!
//! One call runs ACQUIRE_LOCK, APPEND_HEADER, APPEND_LINES,
//! DECREMENT_STOCK, UPDATE_CACHE, RELEASE_LOCK. The ledger is the source
//! of truth: once header and lines are appended the sale is committed,
//! and a stock-update failure is logged rather than rolled back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{Money, VariantKey};
use records::{InventoryRow, SaleHeader, SaleLine, tables};
use tablestore::{Cell, HeaderCache, RetryPolicy, TableStore};
use tracing::warn;

use crate::error::{Result, SalesError};
use crate::lock::{LockGuard, ProcessLock};
use crate::request::{CancelResult, SaleRequest, SaleResult};
use crate::stock::StockCache;

/// Tuning knobs for sale processing.
#[derive(Debug, Clone)]
pub struct SalesConfig {
    /// Bounded wait for the process lock.
    pub lock_timeout: Duration,
    /// Flat shipping cost added to every sale total.
    pub shipping_cost: Money,
    /// Surcharge percentage per payment method, matched case-insensitively.
    pub surcharges: HashMap<String, f64>,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(30),
            shipping_cost: Money::zero(),
            surcharges: HashMap::new(),
        }
    }
}

impl SalesConfig {
    fn surcharge_pct(&self, payment_method: &str) -> f64 {
        let method = payment_method.trim().to_lowercase();
        self.surcharges.get(&method).copied().unwrap_or(0.0)
    }
}

pub struct SaleProcessor {
    store: Arc<dyn TableStore>,
    stock: Arc<StockCache>,
    lock: Arc<dyn ProcessLock>,
    headers: HeaderCache,
    retry: RetryPolicy,
    config: SalesConfig,
}

impl SaleProcessor {
    /// `lock` must be the same lock the stock cache writes under, so a
    /// concurrent rebuild can never interleave with a decrement phase.
    pub fn new(
        store: Arc<dyn TableStore>,
        stock: Arc<StockCache>,
        lock: Arc<dyn ProcessLock>,
        config: SalesConfig,
    ) -> Self {
        Self {
            store,
            stock,
            lock,
            headers: HeaderCache::new(),
            retry: RetryPolicy::default(),
            config,
        }
    }

    /// Commits one sale: ledger rows first, then best-effort stock and
    /// cache updates. Returns [`SalesError::Busy`] with zero writes when
    /// the lock wait times out.
    #[tracing::instrument(skip_all, fields(sale_id = %request.sale_id, lines = request.cart.len()))]
    pub async fn process_sale(&self, request: &SaleRequest) -> Result<SaleResult> {
        if request.cart.is_empty() {
            return Err(SalesError::InvalidRequest {
                reason: "cart is empty".to_string(),
            });
        }

        let sale_id = if request.sale_id.trim().is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            request.sale_id.clone()
        };

        let Some(_guard) = LockGuard::acquire(self.lock.clone(), self.config.lock_timeout).await
        else {
            metrics::counter!("sales_busy_total").increment(1);
            return Err(SalesError::Busy);
        };

        let subtotal: Money = request.cart.iter().map(|item| item.line_total()).sum();
        let surcharge = if request.deactivate_surcharge {
            Money::zero()
        } else {
            subtotal.percentage(self.config.surcharge_pct(&request.payment_method))
        };
        let shipping = self.config.shipping_cost;
        let total = subtotal + surcharge + shipping;

        let header = SaleHeader {
            sale_id: sale_id.clone(),
            store: request.store_id.clone(),
            advisor: request.user_id.clone(),
            customer: request.customer_id.clone(),
            created_at: Utc::now(),
            payment_method: request.payment_method.clone(),
            subtotal,
            surcharge,
            shipping,
            total,
        };
        let header_index = self
            .headers
            .index_for(self.store.as_ref(), tables::SALE_HEADERS)
            .await?;
        let header_row = header.encode(&header_index)?;
        self.retry
            .run(|| self.store.append_row(tables::SALE_HEADERS, header_row.clone()))
            .await?;

        let line_index = self
            .headers
            .index_for(self.store.as_ref(), tables::SALE_LINES)
            .await?;
        for item in &request.cart {
            let line = SaleLine {
                sale_id: sale_id.clone(),
                variation_id: item.variation_id.clone(),
                product: item.product_id.as_str().into(),
                color: item.color.clone(),
                size: item.size.clone(),
                unit_price: Money::from_major(item.price),
                quantity: item.quantity as i64,
                line_total: item.line_total(),
            };
            let line_row = line.encode(&line_index)?;
            self.retry
                .run(|| self.store.append_row(tables::SALE_LINES, line_row.clone()))
                .await?;
        }

        // The sale is committed from here on; stock is a projection.
        let deltas: Vec<(VariantKey, i64)> = request
            .cart
            .iter()
            .map(|item| (item.variant_key(&request.store_id), -(item.quantity as i64)))
            .collect();
        let (updates, skipped) = match self.adjust_inventory(&deltas).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Stock decrement failed, ledger entry kept");
                let all = deltas.iter().map(|(key, _)| key.cache_key()).collect();
                (HashMap::new(), all)
            }
        };

        if !updates.is_empty()
            && let Err(err) = self.stock.apply_delta_unlocked(&updates).await
        {
            warn!(error = %err, "Stock cache update failed, next rebuild reconciles");
        }

        metrics::counter!("sales_processed_total").increment(1);
        Ok(SaleResult {
            sale_id,
            subtotal: subtotal.as_major(),
            surcharge: surcharge.as_major(),
            shipping: shipping.as_major(),
            total_amount: total.as_major(),
            committed_lines: request.cart.len(),
            skipped_variants: skipped,
        })
    }

    /// Removes a sale's header and line rows and restores the stock the
    /// lines had decremented. Runs under the same lock domain as
    /// [`SaleProcessor::process_sale`].
    #[tracing::instrument(skip(self))]
    pub async fn cancel_sale(&self, sale_id: &str) -> Result<CancelResult> {
        let Some(_guard) = LockGuard::acquire(self.lock.clone(), self.config.lock_timeout).await
        else {
            metrics::counter!("sales_busy_total").increment(1);
            return Err(SalesError::Busy);
        };

        let header_index = self
            .headers
            .index_for(self.store.as_ref(), tables::SALE_HEADERS)
            .await?;
        let header_col = header_index.require(SaleHeader::COL_SALE_ID)?;
        let header_rows = self
            .retry
            .run(|| self.store.get_rows(tables::SALE_HEADERS))
            .await?;
        let mut header_matches: Vec<usize> = Vec::new();
        let mut store_name = String::new();
        for (i, row) in header_rows.iter().enumerate() {
            if row.cell(header_col).as_string() == sale_id {
                header_matches.push(i);
                if let Ok(header) = SaleHeader::decode(row, &header_index) {
                    store_name = header.store;
                }
            }
        }
        if header_matches.is_empty() {
            return Err(SalesError::SaleNotFound {
                sale_id: sale_id.to_string(),
            });
        }

        let line_index = self
            .headers
            .index_for(self.store.as_ref(), tables::SALE_LINES)
            .await?;
        let line_col = line_index.require(SaleLine::COL_SALE_ID)?;
        let line_rows = self
            .retry
            .run(|| self.store.get_rows(tables::SALE_LINES))
            .await?;
        let mut line_matches: Vec<usize> = Vec::new();
        let mut deltas: Vec<(VariantKey, i64)> = Vec::new();
        for (i, row) in line_rows.iter().enumerate() {
            if row.cell(line_col).as_string() != sale_id {
                continue;
            }
            line_matches.push(i);
            match SaleLine::decode(row, &line_index) {
                Ok(line) => deltas.push((
                    VariantKey::new(
                        store_name.as_str(),
                        line.product,
                        &line.color,
                        &line.size,
                    ),
                    line.quantity,
                )),
                Err(err) => warn!(row = i, error = %err, "Line row undecodable, deleting without stock restore"),
            }
        }

        let (updates, restored) = match self.adjust_inventory(&deltas).await {
            Ok((updates, skipped)) => {
                let restored = deltas
                    .iter()
                    .map(|(key, _)| key.cache_key())
                    .filter(|key| !skipped.contains(key))
                    .collect();
                (updates, restored)
            }
            Err(err) => {
                warn!(error = %err, "Stock restore failed, rows deleted anyway");
                (HashMap::new(), Vec::new())
            }
        };

        // Highest index first so earlier deletions do not shift later ones.
        for index in line_matches.iter().rev() {
            self.retry
                .run(|| self.store.delete_row(tables::SALE_LINES, *index))
                .await?;
        }
        for index in header_matches.iter().rev() {
            self.retry
                .run(|| self.store.delete_row(tables::SALE_HEADERS, *index))
                .await?;
        }

        if !updates.is_empty()
            && let Err(err) = self.stock.apply_delta_unlocked(&updates).await
        {
            warn!(error = %err, "Stock cache update failed, next rebuild reconciles");
        }

        metrics::counter!("sales_cancelled_total").increment(1);
        Ok(CancelResult {
            sale_id: sale_id.to_string(),
            removed_lines: line_matches.len(),
            restored_variants: restored,
        })
    }

    /// Applies signed stock deltas to the inventory table, mirroring each
    /// delta in the local-sales counter. Returns the resulting absolute
    /// quantities and the keys no inventory row matched.
    async fn adjust_inventory(
        &self,
        deltas: &[(VariantKey, i64)],
    ) -> Result<(HashMap<VariantKey, i64>, Vec<String>)> {
        if deltas.is_empty() {
            return Ok((HashMap::new(), Vec::new()));
        }

        let index = self
            .headers
            .index_for(self.store.as_ref(), tables::INVENTORY)
            .await?;
        index.require_all(InventoryRow::REQUIRED)?;
        let stock_col = index.require(InventoryRow::COL_STOCK)?;
        let local_col = index.get(InventoryRow::COL_LOCAL_SALES);
        let rows = self
            .retry
            .run(|| self.store.get_rows(tables::INVENTORY))
            .await?;

        // First row per key wins; duplicates keep their own stock.
        let mut by_key: HashMap<String, (usize, i64, i64)> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if let Ok(inv) = InventoryRow::decode(row, &index) {
                by_key
                    .entry(inv.key.cache_key())
                    .or_insert((i, inv.stock, inv.local_sales));
            }
        }

        let mut updates = HashMap::new();
        let mut skipped = Vec::new();
        for (key, delta) in deltas {
            let Some((row_index, stock, local)) = by_key.get_mut(&key.cache_key()) else {
                warn!(variant = %key, "No inventory row for variant, skipping stock update");
                skipped.push(key.cache_key());
                continue;
            };
            *stock += delta;
            *local -= delta;
            let (row_index, new_stock, new_local) = (*row_index, *stock, *local);

            self.retry
                .run(|| {
                    self.store.set_cell(
                        tables::INVENTORY,
                        row_index,
                        stock_col,
                        Cell::Number(new_stock as f64),
                    )
                })
                .await?;
            if let Some(col) = local_col {
                self.retry
                    .run(|| {
                        self.store.set_cell(
                            tables::INVENTORY,
                            row_index,
                            col,
                            Cell::Number(new_local as f64),
                        )
                    })
                    .await?;
            }
            updates.insert(key.clone(), new_stock);
        }
        Ok((updates, skipped))
    }
}
