use rusqlite::Statement;
use rusqlite::types::Value;

use crate::command::Command;
use crate::error::DbClientError;
use crate::params::Parameter;
use crate::types::{DbType, DbValue};

/// Prefixes `SQLite` accepts for named placeholders.
const NAME_PREFIXES: [char; 3] = [':', '@', '$'];

/// `SQLite` storage class bound for a generic type tag.
#[must_use]
pub fn sqlite_type_name(db_type: DbType) -> &'static str {
    match db_type {
        DbType::Int32 | DbType::Int64 | DbType::Boolean => "INTEGER",
        DbType::Double => "REAL",
        DbType::Decimal => "NUMERIC",
        DbType::String | DbType::DateTime | DbType::Json => "TEXT",
        DbType::Binary => "BLOB",
    }
}

/// Convert a single `DbValue` to a rusqlite `Value`.
#[must_use]
pub fn db_value_to_sqlite_value(value: &DbValue) -> Value {
    match value {
        DbValue::Int(i) => Value::Integer(*i),
        DbValue::Float(f) => Value::Real(*f),
        DbValue::Text(s) => Value::Text(s.clone()),
        DbValue::Bool(b) => Value::Integer(i64::from(*b)),
        DbValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        DbValue::Json(jval) => Value::Text(jval.to_string()),
        DbValue::Blob(bytes) => Value::Blob(bytes.clone()),
        DbValue::Null => Value::Null,
    }
}

/// Value sent for `parameter`: converted to its bound storage class when possible, then cut
/// to its size.
#[must_use]
pub fn parameter_to_sqlite_value(parameter: &Parameter) -> Value {
    let value = db_value_to_sqlite_value(parameter.value());
    let value = match parameter.provider_type() {
        Some(type_name) => apply_storage_class(value, type_name),
        None => value,
    };
    match parameter.size() {
        Some(size) if size > 0 => truncate(value, size),
        _ => value,
    }
}

fn apply_storage_class(value: Value, type_name: &str) -> Value {
    match (type_name, value) {
        ("INTEGER", Value::Text(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Text(s),
        },
        ("INTEGER", Value::Real(f)) if f.fract() == 0.0 && f.abs() < 9.0e18 => Value::Integer(f as i64),
        ("REAL", Value::Integer(i)) => Value::Real(i as f64),
        ("REAL", Value::Text(s)) => match s.trim().parse::<f64>() {
            Ok(f) => Value::Real(f),
            Err(_) => Value::Text(s),
        },
        ("NUMERIC", Value::Text(s)) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                Value::Integer(i)
            } else if let Ok(f) = t.parse::<f64>() {
                Value::Real(f)
            } else {
                Value::Text(s)
            }
        }
        ("TEXT", Value::Integer(i)) => Value::Text(i.to_string()),
        ("TEXT", Value::Real(f)) => Value::Text(f.to_string()),
        ("BLOB", Value::Text(s)) => Value::Blob(s.into_bytes()),
        (_, value) => value,
    }
}

fn truncate(value: Value, size: usize) -> Value {
    match value {
        Value::Text(s) if s.chars().count() > size => Value::Text(s.chars().take(size).collect()),
        Value::Blob(mut bytes) => {
            bytes.truncate(size);
            Value::Blob(bytes)
        }
        other => other,
    }
}

/// Bind the command's input parameters onto `stmt`.
///
/// With name binding each parameter goes to the placeholder carrying its name, with or
/// without a `:`, `@` or `$` prefix; parameters the statement never mentions are skipped.
/// Without it, input parameters fill placeholders in collection order.
///
/// # Errors
/// Returns `DbClientError::SqliteError` if binding fails.
pub fn bind_parameters(stmt: &mut Statement<'_>, command: &Command) -> Result<(), DbClientError> {
    let placeholder_count = stmt.parameter_count();
    let mut position = 0;
    for parameter in command.parameters() {
        if !parameter.direction().is_input() {
            continue;
        }
        let index = if command.bind_by_name() {
            resolve_named_index(stmt, parameter.name())?
        } else {
            position += 1;
            (position <= placeholder_count).then_some(position)
        };
        let Some(index) = index else {
            tracing::trace!(name = parameter.name(), "parameter not referenced by statement");
            continue;
        };
        stmt.raw_bind_parameter(index, parameter_to_sqlite_value(parameter))?;
    }
    Ok(())
}

fn resolve_named_index(stmt: &Statement<'_>, name: &str) -> Result<Option<usize>, DbClientError> {
    if name.starts_with(NAME_PREFIXES) || name.starts_with('?') {
        return Ok(stmt.parameter_index(name)?);
    }
    for prefix in NAME_PREFIXES {
        if let Some(index) = stmt.parameter_index(&format!("{prefix}{name}"))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterDirection;

    fn typed(db_type: DbType, value: impl Into<DbValue>) -> Parameter {
        let mut p = Parameter::new("p", value);
        p.bind_type(db_type, sqlite_type_name(db_type));
        p
    }

    #[test]
    fn storage_class_conversions() {
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Int64, " 42 ")), Value::Integer(42));
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Int32, "x")), Value::Text("x".into()));
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Double, 2)), Value::Real(2.0));
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Decimal, "1.5")), Value::Real(1.5));
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::String, 7)), Value::Text("7".into()));
        assert_eq!(
            parameter_to_sqlite_value(&typed(DbType::Binary, "ab")),
            Value::Blob(b"ab".to_vec())
        );
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Boolean, true)), Value::Integer(1));
        assert_eq!(parameter_to_sqlite_value(&typed(DbType::Int64, DbValue::Null)), Value::Null);
    }

    #[test]
    fn size_truncates_text_and_blobs() {
        let p = Parameter::new("p", "héllo").with_size(Some(2));
        assert_eq!(parameter_to_sqlite_value(&p), Value::Text("hé".into()));
        let p = Parameter::new("p", vec![1_u8, 2, 3]).with_size(Some(1));
        assert_eq!(parameter_to_sqlite_value(&p), Value::Blob(vec![1]));
        let p = Parameter::new("p", 123_456).with_size(Some(1));
        assert_eq!(parameter_to_sqlite_value(&p), Value::Integer(123_456));
    }

    #[test]
    fn binds_by_name_with_any_prefix() -> Result<(), Box<dyn std::error::Error>> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let mut command = Command::new().with_bind_by_name(true);
        command.set_text(
            "SELECT :a, @b, $c, ?4",
            crate::types::CommandKind::Text,
        );
        let params = command.parameters_mut();
        params.add(Parameter::new("a", 1))?;
        params.add(Parameter::new("@b", 2))?;
        params.add(Parameter::new("c", 3))?;
        params.add(Parameter::new("?4", 4))?;
        params.add(Parameter::new("unused", 5))?;
        params.add(Parameter::new("out", 6).with_direction(ParameterDirection::Output))?;

        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, &command)?;
        let mut rows = stmt.raw_query();
        let row = rows.next()?.expect("one row");
        let values: Vec<i64> = (0..4_usize).map(|i| row.get(i)).collect::<Result<_, _>>()?;
        assert_eq!(values, vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn binds_by_position_without_names() -> Result<(), Box<dyn std::error::Error>> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let mut command = Command::new();
        command.set_text("SELECT ?, ?", crate::types::CommandKind::Text);
        command.parameters_mut().add(Parameter::new("first", "x"))?;
        command.parameters_mut().add(Parameter::new("second", "y"))?;
        command.parameters_mut().add(Parameter::new("third", "z"))?;

        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, &command)?;
        let mut rows = stmt.raw_query();
        let row = rows.next()?.expect("one row");
        assert_eq!(row.get::<_, String>(0)?, "x");
        assert_eq!(row.get::<_, String>(1)?, "y");
        Ok(())
    }
}
