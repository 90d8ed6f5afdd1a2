use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::row::{DataRow, build_index};
use crate::adapter::RowCursor;
use crate::error::DbClientError;
use crate::mapper::{FromDbRow, map_values};
use crate::types::DbValue;

/// Fully loaded, loosely typed result of a reader: columns plus rows.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Arc<Vec<String>>,
    rows: Vec<DataRow>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl DataTable {
    /// Create an empty table with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        let cache = Arc::new(build_index(&columns));
        Self {
            columns: Arc::new(columns),
            rows: Vec::new(),
            column_index_cache: cache,
        }
    }

    /// Drain `cursor` into a new table.
    ///
    /// # Errors
    /// Returns the cursor's error if a row cannot be read.
    pub fn load(cursor: &mut dyn RowCursor) -> Result<Self, DbClientError> {
        let mut table = Self::new(cursor.column_names().to_vec());
        while let Some(values) = cursor.next_row()? {
            table.add_row_values(values);
        }
        Ok(table)
    }

    /// Append a row; values are matched to columns by position.
    pub fn add_row_values(&mut self, values: Vec<DbValue>) {
        self.rows.push(DataRow::with_index(
            Arc::clone(&self.columns),
            values,
            Arc::clone(&self.column_index_cache),
        ));
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row`, `column`, if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&DbValue> {
        self.rows.get(row)?.get(column)
    }

    /// Map every row into `T` using the same name matching as
    /// [`execute_as_mapper`](crate::provider::DbClientProvider::execute_as_mapper).
    ///
    /// # Errors
    /// Returns `DbClientError::MappingError` if a cell does not fit its field.
    pub fn map_rows<T: FromDbRow>(&self) -> Result<Vec<T>, DbClientError> {
        map_values(
            &self.columns,
            self.rows.iter().map(|row| row.values.clone()),
        )
    }
}

impl Serialize for DataTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DataTable", 2)?;
        state.serialize_field("columns", self.columns.as_ref())?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}
