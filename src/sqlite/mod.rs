// SQLite driver adapter, backed by rusqlite.
//
// - config: connection-string parsing into options
// - params: type binding and placeholder resolution
// - query: value extraction and the row cursor
// - connection: the reopenable connection and its transaction handling

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use params::{bind_parameters, sqlite_type_name};
pub use query::{SqliteCursor, sqlite_extract_value};

use crate::adapter::DriverAdapter;
use crate::command::Command;
use crate::error::DbClientError;
use crate::params::Parameter;
use crate::provider::DbClientProvider;
use crate::types::DbType;

/// Adapter for `SQLite` databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl DriverAdapter for SqliteAdapter {
    type Connection = SqliteConnection;

    fn create_connection(&self, connection_string: &str) -> Result<SqliteConnection, DbClientError> {
        Ok(SqliteConnection::new(SqliteOptions::parse(connection_string)?))
    }

    fn create_command(&self) -> Command {
        Command::new().with_bind_by_name(true)
    }

    fn bind_type(&self, parameter: &mut Parameter, db_type: DbType) {
        parameter.bind_type(db_type, sqlite_type_name(db_type));
    }
}

pub type SqliteProvider = DbClientProvider<SqliteAdapter>;

impl DbClientProvider<SqliteAdapter> {
    /// Create a provider over a `SQLite` database and open it.
    ///
    /// # Errors
    /// Returns `DbClientError::ConfigError` for a bad connection string, or the rusqlite error
    /// if the database cannot be opened.
    pub fn sqlite(connection_string: impl Into<String>) -> Result<Self, DbClientError> {
        Self::new(SqliteAdapter, connection_string)
    }
}
