use chrono::{DateTime, Utc};
use common::{Money, ProductCode};
use tablestore::{HeaderIndex, Row};

use crate::decode;

/// Grouping policy a price tier selects for its stock breakdown.
///
/// Bulk kinds (Corte, Fardo, Caja, Docena) sell assorted-only stock as a
/// single bucket; Curva breaks assorted stock down by color; PackX3 by
/// size; anything else is a standard color-by-size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    Corte,
    Fardo,
    Caja,
    Docena,
    Curva,
    PackX3,
    Standard,
}

impl TierKind {
    /// Classifies a tier name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "CORTE" => Self::Corte,
            "FARDO" => Self::Fardo,
            "CAJA" => Self::Caja,
            "DOCENA" => Self::Docena,
            "CURVA" => Self::Curva,
            "PACKX3" => Self::PackX3,
            _ => Self::Standard,
        }
    }

    /// Whether this kind sells assorted stock as one undivided bucket.
    pub fn is_bulk(self) -> bool {
        matches!(self, Self::Corte | Self::Fardo | Self::Caja | Self::Docena)
    }
}

/// One row of the price-tiers table: a purchasable variety of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTier {
    pub product: ProductCode,
    pub name: String,
    pub kind: TierKind,
    pub price: Money,
    pub currency: String,
    pub min_qty: i64,
    pub visible: bool,
    pub updated_at: DateTime<Utc>,
}

impl PriceTier {
    /// Columns that must exist in the price-tiers header.
    pub const REQUIRED: &'static [&'static str] = &["CODIGO_ID", "VARIEDAD", "PRECIO"];

    /// Decodes a price-tier row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        let name = decode::text(row, idx, "VARIEDAD")?;
        Ok(Self {
            product: ProductCode::new(decode::text(row, idx, "CODIGO_ID")?),
            kind: TierKind::parse(&name),
            name,
            price: decode::money(row, idx, "PRECIO")?,
            currency: decode::text_or_default(row, idx, "MONEDA"),
            min_qty: decode::i64_or(row, idx, "CANTIDAD_MINIMA", 1),
            visible: decode::bool_or(row, idx, "VISIBLE_TIENDA", true),
            updated_at: decode::timestamp_or_epoch(row, idx, "ACTUALIZADO"),
        })
    }

    /// Header row for creating the price-tiers table.
    pub fn header() -> Row {
        tablestore::row![
            "CODIGO_ID",
            "VARIEDAD",
            "PRECIO",
            "MONEDA",
            "CANTIDAD_MINIMA",
            "VISIBLE_TIENDA",
            "ACTUALIZADO"
        ]
    }
}
