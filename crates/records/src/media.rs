use chrono::{DateTime, Utc};
use common::ProductCode;
use tablestore::{HeaderIndex, Row};

use crate::decode;

/// One row of the images table.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub product: ProductCode,
    pub url: String,
    pub cover: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl ImageRow {
    /// Columns that must exist in the images header.
    pub const REQUIRED: &'static [&'static str] = &["CODIGO_ID", "URL"];

    /// Decodes an image row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            product: ProductCode::new(decode::text(row, idx, "CODIGO_ID")?),
            url: decode::text(row, idx, "URL")?,
            cover: decode::bool_or(row, idx, "PORTADA", false),
            uploaded_at: decode::timestamp_or_epoch(row, idx, "SUBIDA"),
        })
    }

    /// Header row for creating the images table.
    pub fn header() -> Row {
        tablestore::row!["CODIGO_ID", "URL", "PORTADA", "SUBIDA"]
    }
}
