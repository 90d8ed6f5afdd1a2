use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbClientError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Invalid state: {0}")]
    InvalidStateError(String),

    #[error("Parameter not found: {0}")]
    NotFoundError(String),

    #[error("Duplicate parameter name: {0}")]
    DuplicateParameterError(String),

    #[error("Cannot assign {found} to field `{field}` of type {expected}")]
    MappingError {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl DbClientError {
    /// True for failures raised by the driver while connecting or executing.
    #[must_use]
    pub fn is_provider_execution_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            DbClientError::SqliteError(_) => true,
            DbClientError::ConnectionError(_)
            | DbClientError::ExecutionError(_)
            | DbClientError::Unimplemented(_) => true,
            DbClientError::InvalidStateError(_)
            | DbClientError::NotFoundError(_)
            | DbClientError::DuplicateParameterError(_)
            | DbClientError::MappingError { .. }
            | DbClientError::ConfigError(_) => false,
        }
    }
}
