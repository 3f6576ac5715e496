//! Shared value types for the retail back-office engine.

mod types;

pub use types::{ASSORTED, Money, ProductCode, VariantKey};
