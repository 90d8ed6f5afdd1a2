use super::DbClientProvider;
use crate::adapter::{DriverAdapter, DriverConnection, RowCursor};
use crate::error::DbClientError;
use crate::mapper::{FromDbRow, map_cursor};
use crate::results::DataTable;
use crate::types::DbValue;

impl<A: DriverAdapter> DbClientProvider<A> {
    /// Run the command and load every row into a [`DataTable`].
    ///
    /// # Errors
    /// Returns the driver's error unchanged.
    pub fn execute_as_table(&mut self) -> Result<DataTable, DbClientError> {
        self.prepare_execution("table")?;
        let mut table = None;
        self.connection
            .execute_reader(&mut self.command, &mut |cursor: &mut dyn RowCursor| {
                table = Some(DataTable::load(cursor)?);
                Ok(())
            })?;
        Ok(table.unwrap_or_default())
    }

    /// Run the command and map every row into `T`.
    ///
    /// The whole result is read before returning.
    ///
    /// # Errors
    /// Returns the driver's error unchanged, or `DbClientError::MappingError` when a cell
    /// does not fit its field.
    pub fn execute_as_mapper<T: FromDbRow>(&mut self) -> Result<Vec<T>, DbClientError> {
        self.prepare_execution("mapper")?;
        let mut items = Vec::new();
        self.connection
            .execute_reader(&mut self.command, &mut |cursor: &mut dyn RowCursor| {
                items = map_cursor(cursor)?;
                Ok(())
            })?;
        Ok(items)
    }

    /// Like [`execute_as_mapper`](Self::execute_as_mapper) but keeps only the first record.
    /// An empty result is `Ok(None)`.
    ///
    /// # Errors
    /// Same as [`execute_as_mapper`](Self::execute_as_mapper).
    pub fn execute_as_mapper_single<T: FromDbRow>(&mut self) -> Result<Option<T>, DbClientError> {
        Ok(self.execute_as_mapper::<T>()?.into_iter().next())
    }

    /// First column of the first row, or `DbValue::Null` when there are no rows.
    ///
    /// # Errors
    /// Returns the driver's error unchanged.
    pub fn execute_scalar(&mut self) -> Result<DbValue, DbClientError> {
        self.prepare_execution("scalar")?;
        self.connection.execute_scalar(&mut self.command)
    }

    /// Affected row count as reported by the driver; `-1` is passed through.
    ///
    /// # Errors
    /// Returns the driver's error unchanged.
    pub fn execute_non_query(&mut self) -> Result<i64, DbClientError> {
        self.prepare_execution("non-query")?;
        self.connection.execute_non_query(&mut self.command)
    }

    fn prepare_execution(&mut self, mode: &'static str) -> Result<(), DbClientError> {
        let rewritten = self.command.parameters_mut().normalize();
        self.ensure_open()?;
        tracing::debug!(
            mode,
            kind = ?self.command.kind(),
            parameters = self.command.parameters().len(),
            rewritten,
            in_transaction = self.transaction.is_active(),
            "executing command"
        );
        Ok(())
    }
}
