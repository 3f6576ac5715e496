use async_trait::async_trait;
use sqlx::{PgPool, Row as SqlxRow};

use crate::store::{RowStream, TableStore};
use crate::{Cell, Result, Row, TableStoreError};

/// PostgreSQL-backed table store.
///
/// Every logical table lives in one physical table `table_rows` keyed by
/// `(table_name, row_pos)`, with cells stored as a JSONB array. Position 0
/// is the header row; data rows start at position 1.
#[derive(Clone)]
pub struct PostgresTableStore {
    pool: PgPool,
}

impl PostgresTableStore {
    /// Creates a new PostgreSQL table store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to a database and prepares the backing schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the backing schema if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS table_rows (
                table_name TEXT NOT NULL,
                row_pos BIGINT NOT NULL,
                cells JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_table_rows_pos ON table_rows (table_name, row_pos)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode_cells(value: serde_json::Value) -> Result<Row> {
        Ok(serde_json::from_value(value)?)
    }

    fn encode_cells(row: &Row) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(row)?)
    }

    async fn max_pos(tx: &mut sqlx::PgConnection, table: &str) -> Result<Option<i64>> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(row_pos) FROM table_rows WHERE table_name = $1")
                .bind(table)
                .fetch_one(tx)
                .await?;
        Ok(max)
    }
}

#[async_trait]
impl TableStore for PostgresTableStore {
    async fn get_header(&self, table: &str) -> Result<Row> {
        let row = sqlx::query(
            "SELECT cells FROM table_rows WHERE table_name = $1 AND row_pos = 0",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::decode_cells(row.try_get("cells")?),
            None => Err(TableStoreError::TableNotFound(table.to_string())),
        }
    }

    async fn get_rows(&self, table: &str) -> Result<Vec<Row>> {
        // Distinguish an empty table from a missing one by the header row.
        self.get_header(table).await?;

        let rows = sqlx::query(
            r#"
            SELECT cells FROM table_rows
            WHERE table_name = $1 AND row_pos >= 1
            ORDER BY row_pos ASC
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::decode_cells(row.try_get("cells")?))
            .collect()
    }

    async fn stream_rows(&self, table: &str) -> Result<RowStream> {
        use futures_util::stream;

        // Source tables are bounded to a few thousand rows, so a buffered
        // stream keeps the cursor lifetime out of the trait signature.
        let rows = self.get_rows(table).await?;
        let stream = stream::iter(rows.into_iter().enumerate().map(Ok));
        Ok(Box::pin(stream))
    }

    async fn append_row(&self, table: &str, row: Row) -> Result<usize> {
        let cells = Self::encode_cells(&row)?;

        let mut tx = self.pool.begin().await?;

        let max = Self::max_pos(&mut *tx, table).await?;
        let next = match max {
            Some(pos) => pos + 1,
            None => return Err(TableStoreError::TableNotFound(table.to_string())),
        };

        sqlx::query("INSERT INTO table_rows (table_name, row_pos, cells) VALUES ($1, $2, $3)")
            .bind(table)
            .bind(next)
            .bind(cells)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((next - 1) as usize)
    }

    async fn set_cell(
        &self,
        table: &str,
        row_index: usize,
        col_index: usize,
        cell: Cell,
    ) -> Result<()> {
        let pos = row_index as i64 + 1;

        let mut tx = self.pool.begin().await?;

        let stored = sqlx::query(
            "SELECT cells FROM table_rows WHERE table_name = $1 AND row_pos = $2 FOR UPDATE",
        )
        .bind(table)
        .bind(pos)
        .fetch_optional(&mut *tx)
        .await?;

        let stored = stored.ok_or_else(|| TableStoreError::RowOutOfBounds {
            table: table.to_string(),
            index: row_index,
        })?;

        let mut row = Self::decode_cells(stored.try_get("cells")?)?;
        row.set(col_index, cell);
        let cells = Self::encode_cells(&row)?;

        sqlx::query("UPDATE table_rows SET cells = $3 WHERE table_name = $1 AND row_pos = $2")
            .bind(table)
            .bind(pos)
            .bind(cells)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_row(&self, table: &str, row_index: usize) -> Result<()> {
        let pos = row_index as i64 + 1;

        let mut tx = self.pool.begin().await?;

        let deleted =
            sqlx::query("DELETE FROM table_rows WHERE table_name = $1 AND row_pos = $2")
                .bind(table)
                .bind(pos)
                .execute(&mut *tx)
                .await?;

        if deleted.rows_affected() == 0 {
            return Err(TableStoreError::RowOutOfBounds {
                table: table.to_string(),
                index: row_index,
            });
        }

        sqlx::query(
            "UPDATE table_rows SET row_pos = row_pos - 1 WHERE table_name = $1 AND row_pos > $2",
        )
        .bind(table)
        .bind(pos)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn create_table(&self, table: &str, header: Row) -> Result<()> {
        let cells = Self::encode_cells(&header)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM table_rows WHERE table_name = $1")
            .bind(table)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO table_rows (table_name, row_pos, cells) VALUES ($1, 0, $2)")
            .bind(table)
            .bind(cells)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
