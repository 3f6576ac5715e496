//! Typed records for the back-office tables.
//!
//! Each record type decodes from a [`tablestore::Row`] through a
//! [`tablestore::HeaderIndex`], validating required columns up front and
//! reporting structured schema errors instead of reading undefined cells.

mod decode;
mod error;
mod inventory;
mod ledger;
mod media;
mod pricing;
mod product;
pub mod tables;
mod taxonomy;

pub use error::{RecordError, Result};
pub use inventory::InventoryRow;
pub use ledger::{SaleHeader, SaleLine};
pub use media::ImageRow;
pub use pricing::{PriceTier, TierKind};
pub use product::Product;
pub use taxonomy::{AgencyRow, CategoryRow, ColorRow, IconRow};
