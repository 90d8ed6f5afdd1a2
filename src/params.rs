//! Named command parameters and the normalization pass run before every execution.

use std::fmt;

use crate::error::DbClientError;
use crate::types::{DbType, DbValue, ParameterDirection};

/// One named parameter on a [`Command`](crate::command::Command).
///
/// Names are case-sensitive. The name is fixed once the parameter exists; everything else
/// can be updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    direction: ParameterDirection,
    db_type: Option<DbType>,
    provider_type: Option<&'static str>,
    size: Option<usize>,
    value: DbValue,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<DbValue>) -> Self {
        Self {
            name: name.into(),
            direction: ParameterDirection::Input,
            db_type: None,
            provider_type: None,
            size: None,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: Option<usize>) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: ParameterDirection) {
        self.direction = direction;
    }

    /// Generic type tag the parameter was created with, if any.
    #[must_use]
    pub fn db_type(&self) -> Option<DbType> {
        self.db_type
    }

    /// Engine-specific type name bound by the driver adapter.
    #[must_use]
    pub fn provider_type(&self) -> Option<&'static str> {
        self.provider_type
    }

    /// Record the generic tag together with the engine type it was bound to.
    pub fn bind_type(&mut self, db_type: DbType, provider_type: &'static str) {
        self.db_type = Some(db_type);
        self.provider_type = Some(provider_type);
    }

    #[must_use]
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn set_size(&mut self, size: Option<usize>) {
        self.size = size;
    }

    #[must_use]
    pub fn value(&self) -> &DbValue {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<DbValue>) {
        self.value = value.into();
    }

    /// Rewrite a blank value to NULL. Returns true if the value changed.
    fn normalize(&mut self) -> bool {
        if self.value.is_blank() && !self.value.is_null() {
            self.value = DbValue::Null;
            return true;
        }
        false
    }
}

/// Address of a parameter: its name or its ordinal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for ParameterKey<'a> {
    fn from(name: &'a str) -> Self {
        ParameterKey::Name(name)
    }
}

impl<'a> From<&'a String> for ParameterKey<'a> {
    fn from(name: &'a String) -> Self {
        ParameterKey::Name(name.as_str())
    }
}

impl From<usize> for ParameterKey<'_> {
    fn from(index: usize) -> Self {
        ParameterKey::Index(index)
    }
}

impl fmt::Display for ParameterKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKey::Name(name) => write!(f, "name `{name}`"),
            ParameterKey::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// Ordered collection of uniquely named parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterCollection {
    items: Vec<Parameter>,
}

impl ParameterCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    ///
    /// # Errors
    /// Returns `DbClientError::DuplicateParameterError` if the name is already present.
    pub fn add(&mut self, parameter: Parameter) -> Result<(), DbClientError> {
        if self.contains(parameter.name()) {
            return Err(DbClientError::DuplicateParameterError(
                parameter.name().to_string(),
            ));
        }
        self.items.push(parameter);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|p| p.name == name)
    }

    /// Resolve a key to its position.
    ///
    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the name is absent or the index is out of range.
    pub fn position<'a>(&self, key: impl Into<ParameterKey<'a>>) -> Result<usize, DbClientError> {
        let key = key.into();
        let found = match key {
            ParameterKey::Name(name) => self.items.iter().position(|p| p.name == name),
            ParameterKey::Index(index) => (index < self.items.len()).then_some(index),
        };
        found.ok_or_else(|| DbClientError::NotFoundError(key.to_string()))
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the key does not resolve.
    pub fn get<'a>(&self, key: impl Into<ParameterKey<'a>>) -> Result<&Parameter, DbClientError> {
        let idx = self.position(key)?;
        Ok(&self.items[idx])
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the key does not resolve.
    pub fn get_mut<'a>(
        &mut self,
        key: impl Into<ParameterKey<'a>>,
    ) -> Result<&mut Parameter, DbClientError> {
        let idx = self.position(key)?;
        Ok(&mut self.items[idx])
    }

    /// # Errors
    /// Returns `DbClientError::NotFoundError` if the key does not resolve.
    pub fn remove<'a>(&mut self, key: impl Into<ParameterKey<'a>>) -> Result<Parameter, DbClientError> {
        let idx = self.position(key)?;
        Ok(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Parameter> {
        self.items.iter_mut()
    }

    /// Replace every blank value (NULL, or text that is empty after trimming) with NULL.
    ///
    /// Runs before each execution because values may change between calls. Returns how many
    /// values were rewritten.
    pub fn normalize(&mut self) -> usize {
        let mut rewritten = 0;
        for parameter in &mut self.items {
            if parameter.normalize() {
                tracing::trace!(name = %parameter.name, "blank parameter value sent as NULL");
                rewritten += 1;
            }
        }
        rewritten
    }
}

impl<'a> IntoIterator for &'a ParameterCollection {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
