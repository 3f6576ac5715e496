use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{Result, Row};

/// A stream of `(data_row_index, row)` pairs for one table.
pub type RowStream = Pin<Box<dyn Stream<Item = Result<(usize, Row)>> + Send>>;

/// Core trait for tabular store backends.
///
/// Row indices are data-row ordinals: index 0 is the first row after the
/// header. The header row is only reachable through [`TableStore::get_header`].
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Returns the header row of a table.
    async fn get_header(&self, table: &str) -> Result<Row>;

    /// Returns all data rows of a table in order.
    async fn get_rows(&self, table: &str) -> Result<Vec<Row>>;

    /// Streams all data rows of a table with their indices.
    async fn stream_rows(&self, table: &str) -> Result<RowStream>;

    /// Appends one data row, returning its index.
    async fn append_row(&self, table: &str, row: Row) -> Result<usize>;

    /// Overwrites a single cell of an existing data row.
    async fn set_cell(&self, table: &str, row_index: usize, col_index: usize, cell: crate::Cell)
    -> Result<()>;

    /// Deletes one data row; subsequent rows shift up by one index.
    async fn delete_row(&self, table: &str, row_index: usize) -> Result<()>;

    /// Creates (or resets) a table with the given header row.
    async fn create_table(&self, table: &str, header: Row) -> Result<()>;
}

/// Extension trait providing convenience methods for table stores.
#[async_trait]
pub trait TableStoreExt: TableStore {
    /// Loads a table's header and data rows in one call.
    async fn get_table(&self, table: &str) -> Result<(Row, Vec<Row>)> {
        let header = self.get_header(table).await?;
        let rows = self.get_rows(table).await?;
        Ok((header, rows))
    }

    /// Returns the number of data rows in a table.
    async fn row_count(&self, table: &str) -> Result<usize> {
        Ok(self.get_rows(table).await?.len())
    }
}

// Blanket implementation for all TableStore implementations
impl<T: TableStore + ?Sized> TableStoreExt for T {}
