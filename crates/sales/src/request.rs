//! Inbound sale request and result shapes.

use common::{Money, VariantKey};
use serde::{Deserialize, Serialize};

/// One point-of-sale transaction as submitted by the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Client-assigned sale identifier; one is generated when absent.
    #[serde(default)]
    pub sale_id: String,
    pub store_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub cash_register_id: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub is_mixed_payment: bool,
    #[serde(default)]
    pub transfer_account_id: String,
    #[serde(default)]
    pub deactivate_surcharge: bool,
    #[serde(default)]
    pub cash_payment_amount: f64,
    #[serde(default)]
    pub minor_surcharge: f64,
    #[serde(default)]
    pub transfer_surcharge: f64,
    #[serde(default)]
    pub total_product_amount: f64,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub total_amount: f64,
    pub cart: Vec<CartItem>,
}

/// One cart line of a sale request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default)]
    pub variation_id: String,
    pub product_id: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub category_name: String,
}

impl CartItem {
    /// Inventory identity this line decrements.
    pub fn variant_key(&self, store: &str) -> VariantKey {
        VariantKey::new(store, self.product_id.as_str(), &self.color, &self.size)
    }

    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> Money {
        Money::from_major(self.price).multiply(self.quantity)
    }
}

/// Outcome of a committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResult {
    pub sale_id: String,
    pub subtotal: f64,
    pub surcharge: f64,
    pub shipping: f64,
    pub total_amount: f64,
    pub committed_lines: usize,
    /// Cart lines whose variant key had no inventory row; the sale is
    /// committed regardless and these need manual reconciliation.
    pub skipped_variants: Vec<String>,
}

/// Outcome of a cancelled sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResult {
    pub sale_id: String,
    pub removed_lines: usize,
    pub restored_variants: Vec<String>,
}
