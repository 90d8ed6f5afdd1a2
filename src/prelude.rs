//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::adapter::{BufferedCursor, DriverAdapter, DriverConnection, RowCursor};
pub use crate::config::{ProviderOptions, ProviderOptionsBuilder};
pub use crate::db_record;
pub use crate::error::DbClientError;
pub use crate::mapper::{FromDbRow, FromDbValue, map_cursor};
pub use crate::params::{Parameter, ParameterKey};
pub use crate::provider::{DbClientProvider, TransactionState};
pub use crate::results::{DataRow, DataTable};
pub use crate::shared::SharedProvider;
pub use crate::types::{CommandKind, DbType, DbValue, IsolationLevel, ParameterDirection};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteAdapter, SqliteOptions, SqliteProvider};
