use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Result, Row, TableStore, TableStoreError};

/// Mapping from column name to ordinal index for one table.
///
/// Names are matched case-insensitively with surrounding whitespace
/// trimmed. Any column whose name contains `TOTAL` additionally aliases
/// the canonical `TOTAL` key (first such column wins, an exact `TOTAL`
/// column always wins), which tolerates header-name drift in total
/// columns.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    table: String,
    by_name: HashMap<String, usize>,
    len: usize,
}

impl HeaderIndex {
    /// Builds an index from a table's header row.
    pub fn build(table: impl Into<String>, header: &Row) -> Self {
        let table = table.into();
        let mut by_name = HashMap::new();
        let mut total_alias = None;
        for (idx, cell) in header.iter().enumerate() {
            let name = Self::normalize(&cell.as_string());
            if name.is_empty() {
                continue;
            }
            if total_alias.is_none() && name.contains("TOTAL") {
                total_alias = Some(idx);
            }
            by_name.entry(name).or_insert(idx);
        }
        // Drift alias only when no column is literally named TOTAL.
        if let Some(idx) = total_alias {
            by_name.entry("TOTAL".to_string()).or_insert(idx);
        }
        Self {
            table,
            by_name,
            len: header.len(),
        }
    }

    fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }

    /// Returns the ordinal index of a column, if present.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.by_name.get(&Self::normalize(name)).copied()
    }

    /// Returns the ordinal index of a required column, or a structured
    /// schema error naming the table and column.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.get(name).ok_or_else(|| TableStoreError::MissingColumn {
            table: self.table.clone(),
            column: name.to_string(),
        })
    }

    /// Validates that every listed column exists.
    pub fn require_all(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.require(name)?;
        }
        Ok(())
    }

    /// The table this index was built for.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Width of the header row the index was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the header row had no cells.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Process-lifetime cache of header indices, keyed by table name.
///
/// Built lazily on first access; invalidated explicitly. Holding one
/// `Arc<HeaderIndex>` for the duration of a logical operation guarantees
/// all readers of a table resolve columns through the same index.
#[derive(Default)]
pub struct HeaderCache {
    indices: RwLock<HashMap<String, Arc<HeaderIndex>>>,
}

impl HeaderCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached index for a table, building it from the store's
    /// header row on first access.
    pub async fn index_for(
        &self,
        store: &dyn TableStore,
        table: &str,
    ) -> Result<Arc<HeaderIndex>> {
        if let Some(index) = self.indices.read().await.get(table) {
            return Ok(Arc::clone(index));
        }

        let header = store.get_header(table).await?;
        let index = Arc::new(HeaderIndex::build(table, &header));

        let mut indices = self.indices.write().await;
        // Another caller may have built it while we read the header.
        let entry = indices
            .entry(table.to_string())
            .or_insert_with(|| Arc::clone(&index));
        Ok(Arc::clone(entry))
    }

    /// Drops the cached index for one table.
    pub async fn invalidate(&self, table: &str) {
        self.indices.write().await.remove(table);
    }

    /// Drops every cached index.
    pub async fn invalidate_all(&self) {
        self.indices.write().await.clear();
    }

    /// Number of cached indices.
    pub async fn len(&self) -> usize {
        self.indices.read().await.len()
    }

    /// Returns true when no index is cached.
    pub async fn is_empty(&self) -> bool {
        self.indices.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryTableStore, row};

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let index = HeaderIndex::build("Products", &row![" Codigo_Id ", "CATEGORIA"]);
        assert_eq!(index.get("codigo_id"), Some(0));
        assert_eq!(index.get("CODIGO_ID"), Some(0));
        assert_eq!(index.get("Categoria"), Some(1));
        assert_eq!(index.get("MARCA"), None);
    }

    #[test]
    fn total_column_aliases_canonical_key() {
        let index = HeaderIndex::build("Inventory", &row!["COLOR", "TOTAL_STOCK", "OTRO_TOTAL"]);
        assert_eq!(index.get("TOTAL"), Some(1));
        assert_eq!(index.get("TOTAL_STOCK"), Some(1));
        assert_eq!(index.get("OTRO_TOTAL"), Some(2));
    }

    #[test]
    fn first_total_column_wins() {
        let index = HeaderIndex::build("Inventory", &row!["TOTAL_A", "TOTAL_B"]);
        assert_eq!(index.get("TOTAL"), Some(0));
    }

    #[test]
    fn exact_total_column_beats_the_alias() {
        let index = HeaderIndex::build("Ventas", &row!["SUBTOTAL", "RECARGO", "TOTAL"]);
        assert_eq!(index.get("TOTAL"), Some(2));
        assert_eq!(index.get("SUBTOTAL"), Some(0));
    }

    #[test]
    fn require_reports_table_and_column() {
        let index = HeaderIndex::build("Products", &row!["CODIGO_ID"]);
        let err = index.require("MARCA").unwrap_err();
        match err {
            TableStoreError::MissingColumn { table, column } => {
                assert_eq!(table, "Products");
                assert_eq!(column, "MARCA");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_header_cells_are_skipped() {
        let index = HeaderIndex::build("T", &row!["", "A"]);
        assert_eq!(index.get(""), None);
        assert_eq!(index.get("A"), Some(1));
    }

    #[tokio::test]
    async fn cache_builds_once_and_invalidates() {
        let store = InMemoryTableStore::new();
        store
            .create_table("Products", row!["CODIGO_ID", "CATEGORIA"])
            .await
            .unwrap();

        let cache = HeaderCache::new();
        let first = cache.index_for(&store, "Products").await.unwrap();
        let second = cache.index_for(&store, "Products").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len().await, 1);

        cache.invalidate("Products").await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn cache_surfaces_missing_table() {
        let store = InMemoryTableStore::new();
        let cache = HeaderCache::new();
        let err = cache.index_for(&store, "Nope").await.unwrap_err();
        assert!(matches!(err, TableStoreError::TableNotFound(_)));
    }
}
