use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::ser::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Values carried by command parameters and returned in result cells.
///
/// One enum is shared by every driver adapter so the provider never branches on engine types:
/// ```rust
/// use db_client_provider::prelude::*;
///
/// let values = vec![
///     DbValue::Int(1),
///     DbValue::Text("alice".into()),
///     DbValue::from(Some(true)),
///     DbValue::from(None::<i64>),
/// ];
/// assert!(values[3].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DbValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// SQL NULL; also the absent-value marker
    #[default]
    Null,
}

impl DbValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True when the value is NULL or text that is empty once surrounding whitespace is
    /// trimmed. A zero-length blob is a value, not a missing one.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            DbValue::Null => true,
            DbValue::Text(s) => s.trim().is_empty(),
            DbValue::Int(_)
            | DbValue::Float(_)
            | DbValue::Bool(_)
            | DbValue::Timestamp(_)
            | DbValue::Json(_)
            | DbValue::Blob(_) => false,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let DbValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DbValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let DbValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let DbValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let DbValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let DbValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Short name of the variant, used in mapping errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            DbValue::Int(_) => "Int",
            DbValue::Float(_) => "Float",
            DbValue::Text(_) => "Text",
            DbValue::Bool(_) => "Bool",
            DbValue::Timestamp(_) => "Timestamp",
            DbValue::Json(_) => "Json",
            DbValue::Blob(_) => "Blob",
            DbValue::Null => "Null",
        }
    }
}

/// Text form of a value. NULL renders as the empty string and blobs as lowercase hex.
impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Int(i) => write!(f, "{i}"),
            DbValue::Float(v) => write!(f, "{v}"),
            DbValue::Text(s) => f.write_str(s),
            DbValue::Bool(b) => write!(f, "{b}"),
            DbValue::Timestamp(dt) => write!(f, "{}", dt.format("%F %T%.f")),
            DbValue::Json(v) => write!(f, "{v}"),
            DbValue::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            DbValue::Null => Ok(()),
        }
    }
}

impl Serialize for DbValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DbValue::Int(i) => serializer.serialize_i64(*i),
            DbValue::Float(v) => serializer.serialize_f64(*v),
            DbValue::Text(s) => serializer.serialize_str(s),
            DbValue::Bool(b) => serializer.serialize_bool(*b),
            DbValue::Timestamp(dt) => serializer.collect_str(&dt.format("%F %T%.f")),
            DbValue::Json(v) => v.serialize(serializer),
            DbValue::Blob(_) => serializer.collect_str(self),
            DbValue::Null => serializer.serialize_unit(),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DbValue {
                fn from(value: $ty) -> Self {
                    DbValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for DbValue {
    fn from(value: f64) -> Self {
        DbValue::Float(value)
    }
}

impl From<f32> for DbValue {
    fn from(value: f32) -> Self {
        DbValue::Float(f64::from(value))
    }
}

impl From<bool> for DbValue {
    fn from(value: bool) -> Self {
        DbValue::Bool(value)
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_owned())
    }
}

impl From<NaiveDateTime> for DbValue {
    fn from(value: NaiveDateTime) -> Self {
        DbValue::Timestamp(value)
    }
}

impl From<JsonValue> for DbValue {
    fn from(value: JsonValue) -> Self {
        DbValue::Json(value)
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(value: Vec<u8>) -> Self {
        DbValue::Blob(value)
    }
}

impl From<&[u8]> for DbValue {
    fn from(value: &[u8]) -> Self {
        DbValue::Blob(value.to_vec())
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DbValue::Null, Into::into)
    }
}

/// Engine-neutral type tag for a parameter. Driver adapters translate it into their own
/// type names when a parameter is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DbType {
    Int32,
    Int64,
    Double,
    Decimal,
    String,
    Boolean,
    DateTime,
    Binary,
    Json,
}

impl DbType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Int32 => "int32",
            DbType::Int64 => "int64",
            DbType::Double => "double",
            DbType::Decimal => "decimal",
            DbType::String => "string",
            DbType::Boolean => "boolean",
            DbType::DateTime => "datetime",
            DbType::Binary => "binary",
            DbType::Json => "json",
        }
    }
}

/// Whether a parameter carries a value into the call, out of it, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl ParameterDirection {
    /// Directions whose value is sent to the driver.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::Input | Self::InputOutput)
    }

    /// Directions the driver may write back after execution.
    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(self, Self::Output | Self::InputOutput | Self::ReturnValue)
    }
}

/// Isolation level requested when a transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum IsolationLevel {
    /// Let the engine pick its default.
    #[default]
    Unspecified,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

/// How the command text is interpreted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandKind {
    /// Free-text SQL
    #[default]
    Text,
    /// Name of a stored procedure
    StoredProcedure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(DbValue::Null.is_blank());
        assert!(DbValue::Text(String::new()).is_blank());
        assert!(DbValue::Text(" \t\n ".into()).is_blank());
        assert!(!DbValue::Blob(Vec::new()).is_blank());
        assert!(!DbValue::Text(" x ".into()).is_blank());
        assert!(!DbValue::Int(0).is_blank());
        assert!(!DbValue::Bool(false).is_blank());
        assert!(!DbValue::Json(JsonValue::String(String::new())).is_blank());
    }

    #[test]
    fn bool_accepts_integer_flags() {
        assert_eq!(DbValue::Int(1).as_bool(), Some(&true));
        assert_eq!(DbValue::Int(0).as_bool(), Some(&false));
        assert_eq!(DbValue::Int(2).as_bool(), None);
    }

    #[test]
    fn timestamp_parses_text() {
        let value = DbValue::Text("2024-02-29 13:45:01.250".into());
        let dt = value.as_timestamp().expect("parsed");
        assert_eq!(dt.format("%F %T%.3f").to_string(), "2024-02-29 13:45:01.250");
        assert!(DbValue::Text("yesterday".into()).as_timestamp().is_none());
    }

    #[test]
    fn option_conversion() {
        assert_eq!(DbValue::from(Some(42_i32)), DbValue::Int(42));
        assert_eq!(DbValue::from(None::<&str>), DbValue::Null);
    }

    #[test]
    fn serializes_as_plain_json() {
        let json = serde_json::to_string(&vec![
            DbValue::Int(5),
            DbValue::Text("x".into()),
            DbValue::Null,
            DbValue::Blob(vec![0xde, 0xad]),
        ])
        .expect("serialize");
        assert_eq!(json, r#"[5,"x",null,"dead"]"#);
    }
}
