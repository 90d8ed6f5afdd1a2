use rusqlite::Rows;
use rusqlite::types::ValueRef;

use crate::adapter::RowCursor;
use crate::error::DbClientError;
use crate::types::DbValue;

/// Extract a `DbValue` from a `SQLite` row. Invalid UTF-8 in text is replaced, not rejected.
///
/// # Errors
///
/// Returns `DbClientError::SqliteError` if the column index is out of range.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<DbValue, DbClientError> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => DbValue::Null,
        ValueRef::Integer(i) => DbValue::Int(i),
        ValueRef::Real(f) => DbValue::Float(f),
        ValueRef::Text(bytes) => DbValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(b) => DbValue::Blob(b.to_vec()),
    })
}

/// Row cursor over a running `SQLite` statement.
pub struct SqliteCursor<'stmt> {
    columns: Vec<String>,
    rows: Rows<'stmt>,
}

impl<'stmt> SqliteCursor<'stmt> {
    pub(crate) fn new(columns: Vec<String>, rows: Rows<'stmt>) -> Self {
        Self { columns, rows }
    }
}

impl RowCursor for SqliteCursor<'_> {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<DbValue>>, DbClientError> {
        let col_count = self.columns.len();
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(sqlite_extract_value(row, i)?);
        }
        Ok(Some(values))
    }
}
