//! Lookup-table records: categories, icons, colors and shipping agencies.

use tablestore::{HeaderIndex, Row};

use crate::decode;

/// One row of the categories table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub code: String,
    pub name: String,
    pub parent: String,
}

impl CategoryRow {
    pub const REQUIRED: &'static [&'static str] = &["CODIGO", "NOMBRE"];

    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            code: decode::text(row, idx, "CODIGO")?,
            name: decode::text(row, idx, "NOMBRE")?,
            parent: decode::text_or_default(row, idx, "CATEGORIA_PADRE"),
        })
    }

    pub fn header() -> Row {
        tablestore::row!["CODIGO", "NOMBRE", "CATEGORIA_PADRE"]
    }
}

/// Category name to icon URL mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRow {
    pub category: String,
    pub url: String,
}

impl IconRow {
    pub const REQUIRED: &'static [&'static str] = &["CATEGORIA", "URL"];

    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            category: decode::text(row, idx, "CATEGORIA")?,
            url: decode::text(row, idx, "URL")?,
        })
    }

    pub fn header() -> Row {
        tablestore::row!["CATEGORIA", "URL"]
    }
}

/// Color name to hex code mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRow {
    pub name: String,
    pub hex: String,
}

impl ColorRow {
    pub const REQUIRED: &'static [&'static str] = &["NOMBRE", "HEX"];

    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            name: decode::text(row, idx, "NOMBRE")?,
            hex: decode::text(row, idx, "HEX")?,
        })
    }

    pub fn header() -> Row {
        tablestore::row!["NOMBRE", "HEX"]
    }
}

/// One row of the shipping-agencies table.
#[derive(Debug, Clone, PartialEq)]
pub struct AgencyRow {
    pub name: String,
    pub logo: String,
    pub destinations: Vec<String>,
}

impl AgencyRow {
    pub const REQUIRED: &'static [&'static str] = &["NOMBRE"];

    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            name: decode::text(row, idx, "NOMBRE")?,
            logo: decode::text_or_default(row, idx, "LOGO"),
            destinations: decode::list(row, idx, "DESTINOS"),
        })
    }

    pub fn header() -> Row {
        tablestore::row!["NOMBRE", "LOGO", "DESTINOS"]
    }
}
