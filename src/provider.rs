//! The provider: one connection, one command, at most one transaction.
//!
//! Split across sub-modules the same way the engine connections are:
//! - transaction: begin/commit/rollback and the connection close that follows them
//! - parameters: the parameter store operations
//! - execute: the four execution modes

mod execute;
mod parameters;
mod transaction;

pub use transaction::TransactionState;

use std::fmt;

use crate::adapter::{DriverAdapter, DriverConnection};
use crate::command::Command;
use crate::config::ProviderOptions;
use crate::error::DbClientError;
use crate::types::CommandKind;

/// Uniform data-access front end over one driver connection.
///
/// The connection opens when the provider is created. Statements run outside a transaction
/// reopen it if needed and leave it open; committing or rolling back a transaction closes it.
/// A provider is single-owner; see [`SharedProvider`](crate::shared::SharedProvider) for
/// sharing one between threads.
///
/// ```rust,no_run
/// # #[cfg(feature = "sqlite")]
/// # fn demo() -> Result<(), db_client_provider::DbClientError> {
/// use db_client_provider::prelude::*;
///
/// let mut provider = DbClientProvider::sqlite("Data Source=app.db")?;
/// provider.set_sql_string("SELECT count(*) FROM users WHERE name = :name");
/// provider.add_parameter("name", "alice")?;
/// let count = provider.execute_scalar()?;
/// # let _ = count;
/// # Ok(())
/// # }
/// ```
pub struct DbClientProvider<A: DriverAdapter> {
    adapter: A,
    connection_string: String,
    connection: A::Connection,
    command: Command,
    transaction: TransactionState,
}

impl<A: DriverAdapter> DbClientProvider<A> {
    /// Create a provider and open its connection.
    ///
    /// # Errors
    /// Returns the adapter's error if the connection string is rejected or the connection
    /// cannot be opened.
    pub fn new(adapter: A, connection_string: impl Into<String>) -> Result<Self, DbClientError> {
        Self::with_options(adapter, ProviderOptions::new(connection_string))
    }

    /// Create a provider from explicit options.
    ///
    /// # Errors
    /// Returns the adapter's error if the connection string is rejected, or if
    /// `open_on_create` is set and the connection cannot be opened.
    pub fn with_options(adapter: A, options: ProviderOptions) -> Result<Self, DbClientError> {
        let connection = adapter.create_connection(&options.connection_string)?;
        let command = adapter.create_command();
        let mut provider = Self {
            adapter,
            connection_string: options.connection_string,
            connection,
            command,
            transaction: TransactionState::None,
        };
        if options.open_on_create {
            provider.connection.open()?;
            tracing::debug!("connection opened");
        }
        Ok(provider)
    }

    /// Set the command to free-text SQL.
    pub fn set_sql_string(&mut self, text: impl Into<String>) {
        self.command.set_text(text, CommandKind::Text);
    }

    /// Set the command to a stored procedure call.
    pub fn set_store_procedure(&mut self, name: impl Into<String>) {
        self.command.set_text(name, CommandKind::StoredProcedure);
    }

    /// Close the connection, rolling back a transaction left active. Safe to call repeatedly;
    /// failures are logged, never returned.
    pub fn dispose(&mut self) {
        if let TransactionState::Active(isolation) = self.transaction {
            tracing::debug!(?isolation, "rolling back transaction left active at dispose");
            if let Err(err) = self.connection.rollback() {
                tracing::warn!(error = %err, "rollback during dispose failed");
            }
            self.transaction = TransactionState::None;
            self.command.detach_transaction();
        }
        if self.connection.is_open() {
            if let Err(err) = self.connection.close() {
                tracing::warn!(error = %err, "closing connection during dispose failed");
            } else {
                tracing::debug!("connection closed");
            }
        }
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[must_use]
    pub fn connection(&self) -> &A::Connection {
        &self.connection
    }

    /// Direct access to the driver connection for engine-specific work.
    pub fn connection_mut(&mut self) -> &mut A::Connection {
        &mut self.connection
    }

    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[must_use]
    pub fn is_connection_open(&self) -> bool {
        self.connection.is_open()
    }

    #[must_use]
    pub fn transaction_state(&self) -> TransactionState {
        self.transaction
    }

    /// Open the connection unless a transaction owns it.
    fn ensure_open(&mut self) -> Result<(), DbClientError> {
        if !self.transaction.is_active() && !self.connection.is_open() {
            self.connection.open()?;
            tracing::debug!("connection reopened");
        }
        Ok(())
    }
}

impl<A: DriverAdapter> Drop for DbClientProvider<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<A: DriverAdapter> fmt::Debug for DbClientProvider<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbClientProvider")
            .field("connection_string", &self.connection_string)
            .field("open", &self.connection.is_open())
            .field("command", &self.command)
            .field("transaction", &self.transaction)
            .finish_non_exhaustive()
    }
}
