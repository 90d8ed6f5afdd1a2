//! Helper utilities for testing and development.

use crate::adapter::BufferedCursor;
use crate::results::DataRow;
use crate::types::DbValue;
use std::sync::Arc;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<DbValue>) -> DataRow {
    DataRow::new(Arc::new(column_names), values)
}

/// Create an in-memory cursor from string column names.
#[must_use]
pub fn create_test_cursor(columns: &[&str], rows: Vec<Vec<DbValue>>) -> BufferedCursor {
    BufferedCursor::new(columns.iter().map(|c| (*c).to_string()).collect(), rows)
}
