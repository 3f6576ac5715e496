use common::ProductCode;
use tablestore::{HeaderIndex, Row};

use crate::decode;

/// One row of the products table.
///
/// The declared color/size lists are only consulted when stock is not
/// tracked per variant (simple-product mode).
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub code: ProductCode,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub style: String,
    pub material: String,
    pub gender: String,
    pub season: String,
    pub description: String,
    pub declared_colors: Vec<String>,
    pub declared_sizes: Vec<String>,
    pub simple: bool,
}

impl Product {
    /// Columns that must exist in the products header.
    pub const REQUIRED: &'static [&'static str] = &["CODIGO_ID", "CATEGORIA"];

    /// Decodes a product row, validating required columns.
    pub fn decode(row: &Row, idx: &HeaderIndex) -> crate::Result<Self> {
        Ok(Self {
            code: ProductCode::new(decode::text(row, idx, "CODIGO_ID")?),
            name: decode::text_or_default(row, idx, "NOMBRE"),
            category: decode::text(row, idx, "CATEGORIA")?,
            brand: decode::text_or_default(row, idx, "MARCA"),
            model: decode::text_or_default(row, idx, "MODELO"),
            style: decode::text_or_default(row, idx, "ESTILO"),
            material: decode::text_or_default(row, idx, "MATERIAL"),
            gender: decode::text_or_default(row, idx, "GENERO"),
            season: decode::text_or_default(row, idx, "TEMPORADA"),
            description: decode::text_or_default(row, idx, "DESCRIPCION"),
            declared_colors: decode::list(row, idx, "COLORES"),
            declared_sizes: decode::list(row, idx, "TALLES"),
            simple: decode::bool_or(row, idx, "PRODUCTO_SIMPLE", false),
        })
    }

    /// Header row for creating the products table.
    pub fn header() -> Row {
        tablestore::row![
            "CODIGO_ID",
            "NOMBRE",
            "CATEGORIA",
            "MARCA",
            "MODELO",
            "ESTILO",
            "MATERIAL",
            "GENERO",
            "TEMPORADA",
            "DESCRIPCION",
            "COLORES",
            "TALLES",
            "PRODUCTO_SIMPLE"
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablestore::row;

    #[test]
    fn decode_full_row() {
        let idx = HeaderIndex::build("Productos", &Product::header());
        let row = row![
            "P-100",
            "Remera basica",
            "Remeras",
            "ACME",
            "R-1",
            "Basico",
            "Algodon",
            "Unisex",
            "Verano",
            "Remera de algodon",
            "Rojo,Azul",
            "S,M,L",
            false
        ];

        let product = Product::decode(&row, &idx).unwrap();
        assert_eq!(product.code.as_str(), "P-100");
        assert_eq!(product.category, "Remeras");
        assert_eq!(product.declared_colors, vec!["Rojo", "Azul"]);
        assert_eq!(product.declared_sizes, vec!["S", "M", "L"]);
        assert!(!product.simple);
    }

    #[test]
    fn decode_tolerates_missing_optional_columns() {
        let idx = HeaderIndex::build("Productos", &row!["CODIGO_ID", "CATEGORIA"]);
        let row = row!["P-1", "Pantalones"];

        let product = Product::decode(&row, &idx).unwrap();
        assert_eq!(product.code.as_str(), "P-1");
        assert!(product.brand.is_empty());
        assert!(product.declared_colors.is_empty());
    }

    #[test]
    fn decode_fails_without_required_column() {
        let idx = HeaderIndex::build("Productos", &row!["CODIGO_ID"]);
        let row = row!["P-1"];
        assert!(Product::decode(&row, &idx).is_err());
    }
}
