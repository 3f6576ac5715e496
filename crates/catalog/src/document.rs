//! Published catalog wire shape.
//!
//! Field names and nesting are part of the published contract; external
//! consumers diff successive snapshots, so serialization must stay
//! byte-stable for identical input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level published document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub status: i32,
    pub message: String,
    pub store_url: String,
    pub store_logo: String,
    pub store_banner: String,
    pub shipping_agencies: Vec<ShippingAgency>,
    pub carousel: Vec<String>,
    pub contact: String,
    pub content: Vec<ParentCategoryGroup>,
    pub payment_methods: Vec<String>,
    pub transfer_accounts: Vec<String>,
    pub apply_watermark: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAgency {
    pub name: String,
    pub logo: String,
    pub destinations: Vec<String>,
}

/// One parent-category section of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentCategoryGroup {
    pub parent_category_name: String,
    pub categories: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub code: String,
    pub name: String,
    pub icon_url: String,
    pub products: Vec<CatalogEntry>,
}

/// One product as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub code: String,
    pub category_name: String,
    pub name: String,
    pub description: String,
    pub images: Vec<String>,
    pub variants: Vec<VariantOffer>,
    pub last_updated: String,
}

/// One purchasable price tier of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOffer {
    pub currency: String,
    pub price: f64,
    pub variant_name: String,
    pub min_qty: i64,
    pub stock_breakdown: Vec<StockBucket>,
}

/// Per-color stock bucket; sizes map to available quantities.
///
/// `BTreeMap` keeps size ordering deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBucket {
    pub color: String,
    pub hex: String,
    pub sizes: BTreeMap<String, i64>,
}

impl StockBucket {
    pub fn new(color: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            hex: hex.into(),
            sizes: BTreeMap::new(),
        }
    }

    /// Total quantity across all sizes.
    pub fn total(&self) -> i64 {
        self.sizes.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_camel_case() {
        let doc = CatalogDocument {
            status: 200,
            message: "ok".into(),
            store_url: "https://tienda.example.com".into(),
            store_logo: String::new(),
            store_banner: String::new(),
            shipping_agencies: vec![],
            carousel: vec![],
            contact: String::new(),
            content: vec![],
            payment_methods: vec![],
            transfer_accounts: vec![],
            apply_watermark: false,
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("storeUrl").is_some());
        assert!(json.get("shippingAgencies").is_some());
        assert!(json.get("applyWatermark").is_some());
    }

    #[test]
    fn bucket_total_sums_sizes() {
        let mut bucket = StockBucket::new("Rojo", "#FF0000");
        bucket.sizes.insert("M".into(), 3);
        bucket.sizes.insert("L".into(), 2);
        assert_eq!(bucket.total(), 5);
    }
}
