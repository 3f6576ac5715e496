//! Shared cell-decoding helpers.

use chrono::{DateTime, Utc};
use common::Money;
use tablestore::{Cell, HeaderIndex, Row};

/// Text of a required column.
pub fn text(row: &Row, idx: &HeaderIndex, column: &str) -> crate::Result<String> {
    Ok(row.cell(idx.require(column)?).as_string())
}

/// Text of an optional column, empty string when the column is absent.
pub fn text_or_default(row: &Row, idx: &HeaderIndex, column: &str) -> String {
    idx.get(column)
        .map(|i| row.cell(i).as_string())
        .unwrap_or_default()
}

/// Integer of an optional column, `default` when absent or non-numeric.
pub fn i64_or(row: &Row, idx: &HeaderIndex, column: &str, default: i64) -> i64 {
    idx.get(column)
        .and_then(|i| row.cell(i).as_i64())
        .unwrap_or(default)
}

/// Boolean of an optional column, `default` when absent or unparseable.
pub fn bool_or(row: &Row, idx: &HeaderIndex, column: &str, default: bool) -> bool {
    idx.get(column)
        .and_then(|i| row.cell(i).as_bool())
        .unwrap_or(default)
}

/// Money from a required column holding a major-unit number.
pub fn money(row: &Row, idx: &HeaderIndex, column: &str) -> crate::Result<Money> {
    let i = idx.require(column)?;
    match row.cell(i).as_f64() {
        Some(amount) => Ok(Money::from_major(amount)),
        None if row.cell(i).is_empty() => Ok(Money::zero()),
        None => Err(crate::RecordError::InvalidValue {
            table: idx.table().to_string(),
            column: column.to_string(),
            reason: format!("expected a number, got {:?}", row.cell(i)),
        }),
    }
}

/// Money from an optional column, zero when absent.
pub fn money_or_zero(row: &Row, idx: &HeaderIndex, column: &str) -> Money {
    idx.get(column)
        .and_then(|i| row.cell(i).as_f64())
        .map(Money::from_major)
        .unwrap_or_else(Money::zero)
}

/// Comma-separated list from an optional column.
pub fn list(row: &Row, idx: &HeaderIndex, column: &str) -> Vec<String> {
    text_or_default(row, idx, column)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Timestamp from an optional column: RFC 3339 text or epoch milliseconds.
/// Falls back to the Unix epoch so rows without a timestamp sort last
/// under most-recent-first ordering.
pub fn timestamp_or_epoch(row: &Row, idx: &HeaderIndex, column: &str) -> DateTime<Utc> {
    idx.get(column)
        .and_then(|i| parse_timestamp(row.cell(i)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_timestamp(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Text(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Cell::Number(n) => DateTime::from_timestamp_millis(*n as i64),
        _ => None,
    }
}

/// Renders a timestamp for storage as RFC 3339 text.
pub fn encode_timestamp(ts: DateTime<Utc>) -> Cell {
    Cell::Text(ts.to_rfc3339())
}
