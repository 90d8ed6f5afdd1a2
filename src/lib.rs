//! A uniform data-access front end over a pluggable database driver.
//!
//! [`DbClientProvider`] owns one connection and one command. Callers set SQL text or a stored
//! procedure name, bind named parameters, optionally wrap work in a transaction, and pick one
//! of four execution modes: a loosely typed [`DataTable`], typed records through the
//! [`mapper`], a single scalar, or an affected-row count.
//!
//! Engines plug in through [`DriverAdapter`]; a `SQLite` adapter ships behind the `sqlite`
//! feature and a scripted recording adapter behind `test-utils`.

pub mod adapter;
pub mod command;
pub mod config;
pub mod error;
pub mod mapper;
pub mod params;
pub mod prelude;
pub mod provider;
pub mod results;
pub mod shared;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapter::{BufferedCursor, DriverAdapter, DriverConnection, RowCursor};
pub use command::Command;
pub use config::{ProviderOptions, ProviderOptionsBuilder};
pub use error::DbClientError;
pub use mapper::{FromDbRow, FromDbValue};
pub use params::{Parameter, ParameterCollection, ParameterKey};
pub use provider::{DbClientProvider, TransactionState};
pub use results::{DataRow, DataTable};
pub use shared::SharedProvider;
pub use types::{CommandKind, DbType, DbValue, IsolationLevel, ParameterDirection};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteAdapter, SqliteProvider};
