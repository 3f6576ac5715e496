//! Tabular data store abstraction for the retail back-office engine.
//!
//! Tables are ordered sequences of [`Row`]s with a header row resolving
//! column names to ordinal indices. Two backends are provided: an in-memory
//! store for tests and development, and a PostgreSQL-backed store.

mod cell;
mod error;
mod header;
mod memory;
mod postgres;
mod retry;
pub mod store;

pub use cell::{Cell, Row};
pub use error::{Result, TableStoreError};
pub use header::{HeaderCache, HeaderIndex};
pub use memory::InMemoryTableStore;
pub use postgres::PostgresTableStore;
pub use retry::RetryPolicy;
pub use store::{RowStream, TableStore, TableStoreExt};
