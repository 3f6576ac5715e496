use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{RowStream, TableStore};
use crate::{Cell, Result, Row, TableStoreError};

/// In-memory table store for tests and development.
///
/// Each table is a vector of rows whose first element is the header.
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl InMemoryTableStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends several rows to a table at once.
    pub async fn seed_rows(&self, table: &str, rows: Vec<Row>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        stored.extend(rows);
        Ok(())
    }

    /// Removes every table.
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }

    /// Returns the names of all tables.
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn get_header(&self, table: &str) -> Result<Row> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        rows.first()
            .cloned()
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))
    }

    async fn get_rows(&self, table: &str) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        Ok(rows.iter().skip(1).cloned().collect())
    }

    async fn stream_rows(&self, table: &str) -> Result<RowStream> {
        use futures_util::stream;

        let rows = self.get_rows(table).await?;
        let stream = stream::iter(rows.into_iter().enumerate().map(Ok));
        Ok(Box::pin(stream))
    }

    async fn append_row(&self, table: &str, row: Row) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        rows.push(row);
        Ok(rows.len() - 2)
    }

    async fn set_cell(
        &self,
        table: &str,
        row_index: usize,
        col_index: usize,
        cell: Cell,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        let row = rows
            .get_mut(row_index + 1)
            .ok_or_else(|| TableStoreError::RowOutOfBounds {
                table: table.to_string(),
                index: row_index,
            })?;
        row.set(col_index, cell);
        Ok(())
    }

    async fn delete_row(&self, table: &str, row_index: usize) -> Result<()> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| TableStoreError::TableNotFound(table.to_string()))?;
        if row_index + 1 >= rows.len() {
            return Err(TableStoreError::RowOutOfBounds {
                table: table.to_string(),
                index: row_index,
            });
        }
        rows.remove(row_index + 1);
        Ok(())
    }

    async fn create_table(&self, table: &str, header: Row) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.insert(table.to_string(), vec![header]);
        Ok(())
    }
}
