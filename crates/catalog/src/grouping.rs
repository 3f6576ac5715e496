//! Variant-grouping policies for stock breakdowns.
//!
//! The price tier's kind decides how raw inventory rows collapse into
//! per-color stock buckets. Buckets come out ordered by color name so a
//! rebuilt catalog is byte-identical for identical input.

use std::collections::{BTreeMap, HashMap};

use common::ASSORTED;
use records::{InventoryRow, Product, TierKind};

use crate::document::StockBucket;

/// Placeholder two-tone swatch shown for pooled "Surtido" stock.
pub const ASSORTED_HEX: &str = "#FFFFFF,#9E9E9E";

/// Options affecting the standard (color by size) policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupingOptions {
    /// Drop rows carrying the assorted sentinel in either axis from
    /// standard breakdowns.
    pub exclude_assorted_variants: bool,
}

/// Collapses the inventory rows of one product into stock buckets under
/// the policy selected by `kind`.
pub fn stock_breakdown(
    kind: TierKind,
    rows: &[InventoryRow],
    product: &Product,
    hex_by_color: &HashMap<String, String>,
    options: GroupingOptions,
) -> Vec<StockBucket> {
    if kind.is_bulk() {
        return bulk_breakdown(rows);
    }
    match kind {
        TierKind::Curva => by_color_breakdown(rows, hex_by_color),
        TierKind::PackX3 => by_size_breakdown(rows),
        _ if product.simple => simple_breakdown(rows, product, hex_by_color),
        _ => standard_breakdown(rows, hex_by_color, options),
    }
}

/// Corte/Fardo/Caja/Docena: pooled stock only, one assorted bucket.
fn bulk_breakdown(rows: &[InventoryRow]) -> Vec<StockBucket> {
    let total: i64 = rows
        .iter()
        .filter(|r| r.key.color == ASSORTED && r.key.size == ASSORTED)
        .map(|r| r.stock)
        .sum();
    if total <= 0 {
        return Vec::new();
    }
    let mut bucket = StockBucket::new(ASSORTED, ASSORTED_HEX);
    bucket.sizes.insert(ASSORTED.to_string(), total);
    vec![bucket]
}

/// Curva: assorted sizes broken down per color.
fn by_color_breakdown(
    rows: &[InventoryRow],
    hex_by_color: &HashMap<String, String>,
) -> Vec<StockBucket> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows {
        if row.key.size == ASSORTED && row.stock > 0 {
            *totals.entry(row.key.color.clone()).or_insert(0) += row.stock;
        }
    }
    totals
        .into_iter()
        .map(|(color, total)| {
            let mut bucket = StockBucket::new(&color, hex_for(hex_by_color, &color));
            bucket.sizes.insert(ASSORTED.to_string(), total);
            bucket
        })
        .collect()
}

/// PackX3: assorted colors broken down per size under one bucket.
fn by_size_breakdown(rows: &[InventoryRow]) -> Vec<StockBucket> {
    let mut bucket = StockBucket::new(ASSORTED, ASSORTED_HEX);
    for row in rows {
        if row.key.color == ASSORTED && row.stock > 0 {
            *bucket.sizes.entry(row.key.size.clone()).or_insert(0) += row.stock;
        }
    }
    if bucket.sizes.is_empty() {
        Vec::new()
    } else {
        vec![bucket]
    }
}

/// Standard: one bucket per color, one size entry per (color, size) pair.
fn standard_breakdown(
    rows: &[InventoryRow],
    hex_by_color: &HashMap<String, String>,
    options: GroupingOptions,
) -> Vec<StockBucket> {
    let mut buckets: BTreeMap<String, StockBucket> = BTreeMap::new();
    for row in rows {
        if row.stock <= 0 {
            continue;
        }
        let assorted = row.key.color == ASSORTED || row.key.size == ASSORTED;
        if assorted && options.exclude_assorted_variants {
            continue;
        }
        let bucket = buckets.entry(row.key.color.clone()).or_insert_with(|| {
            let hex = if row.key.color == ASSORTED {
                ASSORTED_HEX.to_string()
            } else {
                hex_for(hex_by_color, &row.key.color)
            };
            StockBucket::new(&row.key.color, hex)
        });
        *bucket.sizes.entry(row.key.size.clone()).or_insert(0) += row.stock;
    }
    buckets.into_values().collect()
}

/// Simple-product mode: declared colors and sizes cross-joined, each pair
/// carrying the product's aggregate stock. No per-row stock filtering.
fn simple_breakdown(
    rows: &[InventoryRow],
    product: &Product,
    hex_by_color: &HashMap<String, String>,
) -> Vec<StockBucket> {
    let total: i64 = rows.iter().map(|r| r.stock).sum();
    let mut buckets = Vec::with_capacity(product.declared_colors.len());
    for color in &product.declared_colors {
        let mut bucket = StockBucket::new(color, hex_for(hex_by_color, color));
        for size in &product.declared_sizes {
            bucket.sizes.insert(size.clone(), total);
        }
        buckets.push(bucket);
    }
    buckets
}

fn hex_for(hex_by_color: &HashMap<String, String>, color: &str) -> String {
    hex_by_color.get(color).cloned().unwrap_or_default()
}
