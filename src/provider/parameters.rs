use super::DbClientProvider;
use crate::adapter::DriverAdapter;
use crate::error::DbClientError;
use crate::params::{Parameter, ParameterKey};
use crate::types::{DbType, DbValue, ParameterDirection};

impl<A: DriverAdapter> DbClientProvider<A> {
    /// Add an input parameter with only a name and a value.
    ///
    /// # Errors
    /// Returns `DbClientError::DuplicateParameterError` if `name` already exists.
    pub fn add_parameter(
        &mut self,
        name: &str,
        value: impl Into<DbValue>,
    ) -> Result<(), DbClientError> {
        self.push_parameter(name, None, None, value.into(), ParameterDirection::Input)
    }

    /// Add an input parameter with an optional type tag and size.
    ///
    /// # Errors
    /// Returns `DbClientError::DuplicateParameterError` if `name` already exists, or the
    /// adapter's error if it rejects the tag.
    pub fn add_typed_parameter(
        &mut self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: impl Into<DbValue>,
    ) -> Result<(), DbClientError> {
        self.push_parameter(name, db_type, size, value.into(), ParameterDirection::Input)
    }

    /// Add a parameter marked explicitly as input.
    ///
    /// # Errors
    /// Same as [`add_typed_parameter`](Self::add_typed_parameter).
    pub fn add_in_parameter(
        &mut self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: impl Into<DbValue>,
    ) -> Result<(), DbClientError> {
        self.push_parameter(name, db_type, size, value.into(), ParameterDirection::Input)
    }

    /// Add an output parameter; drivers that support it write the value back after execution.
    ///
    /// # Errors
    /// Same as [`add_typed_parameter`](Self::add_typed_parameter).
    pub fn add_out_parameter(
        &mut self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: impl Into<DbValue>,
    ) -> Result<(), DbClientError> {
        self.push_parameter(name, db_type, size, value.into(), ParameterDirection::Output)
    }

    /// Add a parameter with any direction.
    ///
    /// # Errors
    /// Same as [`add_typed_parameter`](Self::add_typed_parameter).
    pub fn add_parameter_with_direction(
        &mut self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: impl Into<DbValue>,
        direction: ParameterDirection,
    ) -> Result<(), DbClientError> {
        self.push_parameter(name, db_type, size, value.into(), direction)
    }

    fn push_parameter(
        &mut self,
        name: &str,
        db_type: Option<DbType>,
        size: Option<usize>,
        value: DbValue,
        direction: ParameterDirection,
    ) -> Result<(), DbClientError> {
        if self.command.parameters().contains(name) {
            return Err(DbClientError::DuplicateParameterError(name.to_string()));
        }
        let parameter = self
            .adapter
            .create_parameter(name, db_type, size, value, direction)?;
        self.command.parameters_mut().add(parameter)
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the name or index does not exist.
    pub fn get_parameter<'a>(
        &self,
        key: impl Into<ParameterKey<'a>>,
    ) -> Result<&Parameter, DbClientError> {
        self.command.parameters().get(key)
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the name or index does not exist.
    pub fn get_parameter_value<'a>(
        &self,
        key: impl Into<ParameterKey<'a>>,
    ) -> Result<&DbValue, DbClientError> {
        Ok(self.get_parameter(key)?.value())
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the name or index does not exist.
    pub fn set_parameter_value<'a>(
        &mut self,
        key: impl Into<ParameterKey<'a>>,
        value: impl Into<DbValue>,
    ) -> Result<(), DbClientError> {
        self.command.parameters_mut().get_mut(key)?.set_value(value);
        Ok(())
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the name or index does not exist.
    pub fn remove_parameter<'a>(
        &mut self,
        key: impl Into<ParameterKey<'a>>,
    ) -> Result<Parameter, DbClientError> {
        self.command.parameters_mut().remove(key)
    }

    pub fn clear_parameters(&mut self) {
        self.command.parameters_mut().clear();
    }
}
