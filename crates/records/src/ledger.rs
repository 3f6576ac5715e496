//! Append-only sale ledger rows.
//!
//! Headers and lines are written once by the sale processor and never
//! updated in place; cancellation removes the rows again.

use chrono::{DateTime, Utc};
use common::{Money, ProductCode};
use tablestore::{Cell, HeaderIndex, Row};

use crate::decode;

/// One row of the sale-headers table.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleHeader {
    pub sale_id: String,
    pub store: String,
    pub advisor: String,
    pub customer: String,
    pub created_at: DateTime<Utc>,
    pub payment_method: String,
    pub subtotal: Money,
    pub surcharge: Money,
    pub shipping: Money,
    pub total: Money,
}

impl SaleHeader {
    /// Columns that must exist in the sale-headers header.
    pub const REQUIRED: &'static [&'static str] = &["VENTA_ID", "TIENDA", "TOTAL"];

    /// Sale-id column name, used to locate a sale's rows for cancellation.
    pub const COL_SALE_ID: &'static str = "VENTA_ID";

    /// Decodes a sale-header row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            sale_id: decode::text(row, idx, Self::COL_SALE_ID)?,
            store: decode::text(row, idx, "TIENDA")?,
            advisor: decode::text_or_default(row, idx, "VENDEDOR"),
            customer: decode::text_or_default(row, idx, "CLIENTE"),
            created_at: decode::timestamp_or_epoch(row, idx, "FECHA"),
            payment_method: decode::text_or_default(row, idx, "MEDIO_PAGO"),
            subtotal: decode::money_or_zero(row, idx, "SUBTOTAL"),
            surcharge: decode::money_or_zero(row, idx, "RECARGO"),
            shipping: decode::money_or_zero(row, idx, "ENVIO"),
            total: decode::money(row, idx, "TOTAL")?,
        })
    }

    /// Renders this header as a row laid out for `idx`.
    pub fn encode(&self, idx: &HeaderIndex) -> crate::Result<Row> {
        let mut row = Row::default();
        row.set(idx.require(Self::COL_SALE_ID)?, self.sale_id.as_str().into());
        row.set(idx.require("TIENDA")?, self.store.as_str().into());
        if let Some(i) = idx.get("VENDEDOR") {
            row.set(i, self.advisor.as_str().into());
        }
        if let Some(i) = idx.get("CLIENTE") {
            row.set(i, self.customer.as_str().into());
        }
        if let Some(i) = idx.get("FECHA") {
            row.set(i, decode::encode_timestamp(self.created_at));
        }
        if let Some(i) = idx.get("MEDIO_PAGO") {
            row.set(i, self.payment_method.as_str().into());
        }
        if let Some(i) = idx.get("SUBTOTAL") {
            row.set(i, Cell::Number(self.subtotal.as_major()));
        }
        if let Some(i) = idx.get("RECARGO") {
            row.set(i, Cell::Number(self.surcharge.as_major()));
        }
        if let Some(i) = idx.get("ENVIO") {
            row.set(i, Cell::Number(self.shipping.as_major()));
        }
        row.set(idx.require("TOTAL")?, Cell::Number(self.total.as_major()));
        Ok(row)
    }

    /// Header row for creating the sale-headers table.
    pub fn header() -> Row {
        tablestore::row![
            "VENTA_ID",
            "TIENDA",
            "VENDEDOR",
            "CLIENTE",
            "FECHA",
            "MEDIO_PAGO",
            "SUBTOTAL",
            "RECARGO",
            "ENVIO",
            "TOTAL"
        ]
    }
}

/// One row of the sale-lines table.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub sale_id: String,
    pub variation_id: String,
    pub product: ProductCode,
    pub color: String,
    pub size: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

impl SaleLine {
    /// Columns that must exist in the sale-lines header.
    pub const REQUIRED: &'static [&'static str] =
        &["VENTA_ID", "CODIGO_ID", "CANTIDAD", "PRECIO_UNITARIO"];

    /// Sale-id column name, used to locate a sale's rows for cancellation.
    pub const COL_SALE_ID: &'static str = "VENTA_ID";

    /// Decodes a sale-line row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        let unit_price = decode::money(row, idx, "PRECIO_UNITARIO")?;
        let quantity = decode::i64_or(row, idx, "CANTIDAD", 0);
        Ok(Self {
            sale_id: decode::text(row, idx, Self::COL_SALE_ID)?,
            variation_id: decode::text_or_default(row, idx, "VARIACION_ID"),
            product: ProductCode::new(decode::text(row, idx, "CODIGO_ID")?),
            color: decode::text_or_default(row, idx, "COLOR"),
            size: decode::text_or_default(row, idx, "TALLE"),
            unit_price,
            quantity,
            line_total: decode::money_or_zero(row, idx, "TOTAL_LINEA"),
        })
    }

    /// Renders this line as a row laid out for `idx`.
    pub fn encode(&self, idx: &HeaderIndex) -> crate::Result<Row> {
        let mut row = Row::default();
        row.set(idx.require(Self::COL_SALE_ID)?, self.sale_id.as_str().into());
        if let Some(i) = idx.get("VARIACION_ID") {
            row.set(i, self.variation_id.as_str().into());
        }
        row.set(idx.require("CODIGO_ID")?, self.product.as_str().into());
        if let Some(i) = idx.get("COLOR") {
            row.set(i, self.color.as_str().into());
        }
        if let Some(i) = idx.get("TALLE") {
            row.set(i, self.size.as_str().into());
        }
        row.set(
            idx.require("PRECIO_UNITARIO")?,
            Cell::Number(self.unit_price.as_major()),
        );
        row.set(idx.require("CANTIDAD")?, Cell::Number(self.quantity as f64));
        if let Some(i) = idx.get("TOTAL_LINEA") {
            row.set(i, Cell::Number(self.line_total.as_major()));
        }
        Ok(row)
    }

    /// Header row for creating the sale-lines table.
    pub fn header() -> Row {
        tablestore::row![
            "VENTA_ID",
            "VARIACION_ID",
            "CODIGO_ID",
            "COLOR",
            "TALLE",
            "PRECIO_UNITARIO",
            "CANTIDAD",
            "TOTAL_LINEA"
        ]
    }
}
