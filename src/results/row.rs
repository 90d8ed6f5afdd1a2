use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::DbValue;

/// A row of a [`DataTable`](super::DataTable)
///
/// This struct represents a single row from a loaded result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct DataRow {
    /// The column names for this row (shared across all rows in a table)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<DbValue>,
    // Column name to index, shared with the owning table
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl DataRow {
    /// Create a new row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `values` - The values for this row
    ///
    /// # Returns
    ///
    /// A new `DataRow` instance
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<DbValue>) -> Self {
        let cache = Arc::new(build_index(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        values: Vec<DbValue>,
        column_index_cache: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    /// Get the index of a column by name
    ///
    /// Names match exactly; the first column wins when a name repeats.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value from the row by column name
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&DbValue> {
        let idx = self.get_column_index(column_name)?;
        self.values.get(idx)
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }
}

/// Serializes as a JSON object keyed by column name.
impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.column_names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub(crate) fn build_index(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_row;
    use crate::types::DbValue;

    #[test]
    fn repeated_column_names_resolve_to_the_first() {
        let row = create_test_row(
            vec!["id".into(), "name".into(), "id".into()],
            vec![DbValue::Int(1), DbValue::Text("a".into()), DbValue::Int(3)],
        );
        assert_eq!(row.get_column_index("id"), Some(0));
        assert_eq!(row.get("id"), Some(&DbValue::Int(1)));
        assert_eq!(row.get_by_index(2), Some(&DbValue::Int(3)));
        assert_eq!(row.get("ID"), None);
    }
}
