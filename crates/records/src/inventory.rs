use common::{ProductCode, VariantKey};
use tablestore::{HeaderIndex, Row};

use crate::decode;

/// One row of the inventory table: live stock for a variant key plus
/// cumulative movement counters.
///
/// At most one row per key is expected; duplicates are legal and summed
/// during aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub key: VariantKey,
    pub stock: i64,
    pub entries: i64,
    pub web_sales: i64,
    pub local_sales: i64,
}

impl InventoryRow {
    /// Columns that must exist in the inventory header.
    pub const REQUIRED: &'static [&'static str] =
        &["TIENDA", "CODIGO_ID", "COLOR", "TALLE", "STOCK"];

    /// Stock column name, for in-place decrements.
    pub const COL_STOCK: &'static str = "STOCK";
    /// Local-sales counter column name.
    pub const COL_LOCAL_SALES: &'static str = "VENTAS_LOCAL";

    /// Decodes an inventory row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            key: VariantKey {
                store: decode::text(row, idx, "TIENDA")?,
                product: ProductCode::new(decode::text(row, idx, "CODIGO_ID")?),
                color: decode::text(row, idx, "COLOR")?,
                size: decode::text(row, idx, "TALLE")?,
            },
            stock: decode::i64_or(row, idx, Self::COL_STOCK, 0),
            entries: decode::i64_or(row, idx, "INGRESOS", 0),
            web_sales: decode::i64_or(row, idx, "VENTAS_WEB", 0),
            local_sales: decode::i64_or(row, idx, Self::COL_LOCAL_SALES, 0),
        })
    }

    /// Header row for creating the inventory table.
    pub fn header() -> Row {
        tablestore::row![
            "TIENDA",
            "CODIGO_ID",
            "COLOR",
            "TALLE",
            "STOCK",
            "INGRESOS",
            "VENTAS_WEB",
            "VENTAS_LOCAL"
        ]
    }
}
