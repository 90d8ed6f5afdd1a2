//! The driver seam: what an engine must supply for the provider to drive it.
//!
//! A driver adapter is a small value that produces connections and parameters for one
//! concrete engine. The provider owns exactly one connection from its adapter and never asks
//! which engine sits behind it.

use crate::command::Command;
use crate::error::DbClientError;
use crate::params::Parameter;
use crate::types::{DbType, DbValue, IsolationLevel, ParameterDirection};

/// Forward-only, single-pass cursor over the rows of one result.
pub trait RowCursor {
    /// Column names in result order.
    fn column_names(&self) -> &[String];

    /// Advance one row. Returns `None` once the result is exhausted.
    ///
    /// # Errors
    /// Returns the driver's error if reading the row fails.
    fn next_row(&mut self) -> Result<Option<Vec<DbValue>>, DbClientError>;
}

/// Callback receiving the cursor of an executed reader.
pub type ReaderVisitor<'v> = dyn FnMut(&mut dyn RowCursor) -> Result<(), DbClientError> + 'v;

/// One engine connection. Opening and closing are repeatable.
pub trait DriverConnection {
    /// Open the connection. Opening an open connection is a no-op.
    ///
    /// # Errors
    /// Returns the driver's error if the connection cannot be established.
    fn open(&mut self) -> Result<(), DbClientError>;

    /// Close the connection. Closing a closed connection is a no-op.
    ///
    /// # Errors
    /// Returns the driver's error if closing fails; the connection counts as closed anyway.
    fn close(&mut self) -> Result<(), DbClientError>;

    fn is_open(&self) -> bool;

    /// # Errors
    /// Returns the driver's error if the transaction cannot be started.
    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), DbClientError>;

    /// # Errors
    /// Returns the driver's error if the commit fails.
    fn commit(&mut self) -> Result<(), DbClientError>;

    /// # Errors
    /// Returns the driver's error if the rollback fails.
    fn rollback(&mut self) -> Result<(), DbClientError>;

    /// Execute the command and hand its row cursor to `visit`. The cursor is only valid
    /// inside the callback.
    ///
    /// # Errors
    /// Returns the driver's error, or whatever `visit` returns.
    fn execute_reader(
        &mut self,
        command: &mut Command,
        visit: &mut ReaderVisitor<'_>,
    ) -> Result<(), DbClientError>;

    /// Execute the command and report the number of affected rows; `-1` means unknown.
    ///
    /// # Errors
    /// Returns the driver's error if execution fails.
    fn execute_non_query(&mut self, command: &mut Command) -> Result<i64, DbClientError>;

    /// First column of the first row, or `DbValue::Null` when there are no rows.
    ///
    /// # Errors
    /// Returns the driver's error if execution fails.
    fn execute_scalar(&mut self, command: &mut Command) -> Result<DbValue, DbClientError> {
        let mut first = DbValue::Null;
        self.execute_reader(command, &mut |cursor: &mut dyn RowCursor| {
            if let Some(mut row) = cursor.next_row()?
                && !row.is_empty()
            {
                first = row.swap_remove(0);
            }
            Ok(())
        })?;
        Ok(first)
    }
}

/// Factory binding the provider to one engine.
pub trait DriverAdapter {
    type Connection: DriverConnection;

    /// Create a closed connection for `connection_string`.
    ///
    /// # Errors
    /// Returns `DbClientError::ConfigError` if the connection string cannot be understood.
    fn create_connection(&self, connection_string: &str)
    -> Result<Self::Connection, DbClientError>;

    /// Create the provider's command, with any engine-specific configuration applied.
    fn create_command(&self) -> Command {
        Command::new()
    }

    /// Bind the engine's type for a generic tag onto `parameter`.
    fn bind_type(&self, parameter: &mut Parameter, db_type: DbType);

    /// Build a parameter, binding the engine type when a tag is given.
    ///
    /// # Errors
    /// Adapters that reject a tag or size return an error; the default never fails.
    fn create_parameter(
        &self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: DbValue,
        direction: ParameterDirection,
    ) -> Result<Parameter, DbClientError> {
        let mut parameter = Parameter::new(name, value)
            .with_direction(direction)
            .with_size(size);
        if let Some(db_type) = db_type {
            self.bind_type(&mut parameter, db_type);
        }
        Ok(parameter)
    }
}

/// Cursor over rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    columns: Vec<String>,
    rows: std::collections::VecDeque<Vec<DbValue>>,
}

impl BufferedCursor {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<DbValue>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }
}

impl RowCursor for BufferedCursor {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<DbValue>>, DbClientError> {
        Ok(self.rows.pop_front())
    }
}
