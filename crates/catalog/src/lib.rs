//! Catalog aggregation: flattens the back-office tables into the
//! hierarchical published document.

pub mod aggregator;
pub mod document;
mod error;
pub mod grouping;
pub mod images;

pub use aggregator::{Branding, CatalogConfig, build_catalog};
pub use document::{
    CatalogDocument, CatalogEntry, CategoryGroup, ParentCategoryGroup, ShippingAgency,
    StockBucket, VariantOffer,
};
pub use error::{CatalogError, Result};
pub use grouping::ASSORTED_HEX;
