use super::DbClientProvider;
use crate::adapter::{DriverAdapter, DriverConnection};
use crate::error::DbClientError;
use crate::types::IsolationLevel;

/// Transaction lifecycle of a provider. Commit and rollback both return to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    #[default]
    None,
    Active(IsolationLevel),
}

impl TransactionState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    #[must_use]
    pub fn isolation_level(&self) -> Option<IsolationLevel> {
        match self {
            Self::Active(isolation) => Some(*isolation),
            Self::None => None,
        }
    }
}

impl<A: DriverAdapter> DbClientProvider<A> {
    /// Begin a transaction with the engine's default isolation.
    ///
    /// # Errors
    /// Returns `DbClientError::InvalidStateError` if a transaction is already active, or the
    /// driver's error if the connection cannot be opened or the transaction started.
    pub fn begin_transaction(&mut self) -> Result<(), DbClientError> {
        self.begin_transaction_with(IsolationLevel::Unspecified)
    }

    /// Begin a transaction with an explicit isolation level.
    ///
    /// # Errors
    /// Returns `DbClientError::InvalidStateError` if a transaction is already active, or the
    /// driver's error if the connection cannot be opened or the transaction started.
    pub fn begin_transaction_with(
        &mut self,
        isolation: IsolationLevel,
    ) -> Result<(), DbClientError> {
        if let TransactionState::Active(current) = self.transaction {
            return Err(DbClientError::InvalidStateError(format!(
                "transaction already active ({current:?})"
            )));
        }
        if !self.connection.is_open() {
            self.connection.open()?;
            tracing::debug!("connection opened for transaction");
        }
        self.connection.begin(isolation)?;
        self.transaction = TransactionState::Active(isolation);
        self.command.attach_transaction(isolation);
        tracing::debug!(?isolation, "transaction started");
        Ok(())
    }

    /// Commit the active transaction and close the connection.
    ///
    /// The connection is closed and the transaction released even when the commit fails.
    ///
    /// # Errors
    /// Returns `DbClientError::InvalidStateError` without touching anything if no transaction
    /// is active; otherwise the commit error, or the close error if only closing failed.
    pub fn commit_transaction(&mut self) -> Result<(), DbClientError> {
        self.require_active("commit")?;
        let outcome = self.connection.commit();
        tracing::debug!(ok = outcome.is_ok(), "transaction committed");
        self.finish_transaction(outcome)
    }

    /// Roll back the active transaction and close the connection.
    ///
    /// The connection is closed and the transaction released even when the rollback fails.
    ///
    /// # Errors
    /// Returns `DbClientError::InvalidStateError` without touching anything if no transaction
    /// is active; otherwise the rollback error, or the close error if only closing failed.
    pub fn rollback_transaction(&mut self) -> Result<(), DbClientError> {
        self.require_active("rollback")?;
        let outcome = self.connection.rollback();
        tracing::debug!(ok = outcome.is_ok(), "transaction rolled back");
        self.finish_transaction(outcome)
    }

    fn require_active(&self, operation: &str) -> Result<(), DbClientError> {
        if self.transaction.is_active() {
            Ok(())
        } else {
            Err(DbClientError::InvalidStateError(format!(
                "cannot {operation}: no active transaction"
            )))
        }
    }

    fn finish_transaction(
        &mut self,
        outcome: Result<(), DbClientError>,
    ) -> Result<(), DbClientError> {
        self.transaction = TransactionState::None;
        self.command.detach_transaction();
        let closed = if self.connection.is_open() {
            self.connection.close()
        } else {
            Ok(())
        };
        match (outcome, closed) {
            (Ok(()), closed) => {
                if closed.is_ok() {
                    tracing::debug!("connection closed after transaction");
                }
                closed
            }
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                tracing::warn!(error = %close_err, "closing connection after failed transaction end");
                Err(err)
            }
        }
    }
}
