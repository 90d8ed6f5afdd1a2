//! Turning result rows into caller-defined record types.
//!
//! A record declares its settable fields once through [`FromDbRow`], usually by wrapping the
//! struct definition in [`db_record!`](crate::db_record). For every row the mapper builds a
//! default record, then assigns each field whose name exactly matches a column. NULL cells
//! leave the field at its default; fields without a column and columns without a field are
//! ignored.
//!
//! ```rust
//! use db_client_provider::prelude::*;
//!
//! db_record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Person {
//!         pub name: String,
//!         pub age: i64,
//!     }
//! }
//!
//! let mut cursor = BufferedCursor::new(
//!     vec!["name".into(), "age".into()],
//!     vec![
//!         vec![DbValue::Text("A".into()), DbValue::Int(5)],
//!         vec![DbValue::Text("B".into()), DbValue::Null],
//!     ],
//! );
//! let people: Vec<Person> = map_cursor(&mut cursor)?;
//! assert_eq!(people[1], Person { name: "B".into(), age: 0 });
//! # Ok::<(), DbClientError>(())
//! ```

mod macros;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::adapter::RowCursor;
use crate::error::DbClientError;
use crate::types::DbValue;

/// A record type the mapper can fill from named columns.
pub trait FromDbRow: Default {
    /// Names of the settable fields, matched case-sensitively against column names.
    const FIELDS: &'static [&'static str];

    /// Assign a non-NULL cell to `field`.
    ///
    /// # Errors
    /// Returns `DbClientError::MappingError` when the value does not fit the field's type.
    fn set_field(&mut self, field: &str, value: DbValue) -> Result<(), DbClientError>;
}

/// Conversion from a non-NULL cell into a field type.
///
/// Only conversions the cell representation already carries are accepted; on mismatch the
/// value is handed back so the caller can report it.
pub trait FromDbValue: Sized {
    /// # Errors
    /// Returns the original value when it cannot represent `Self`.
    fn from_db_value(value: DbValue) -> Result<Self, DbValue>;
}

/// Convert `value` for `field`, producing a `MappingError` on mismatch.
///
/// # Errors
/// Returns `DbClientError::MappingError` naming the field, the target type and the value.
pub fn assign_field<T: FromDbValue>(field: &str, value: DbValue) -> Result<T, DbClientError> {
    T::from_db_value(value).map_err(|found| DbClientError::MappingError {
        field: field.to_string(),
        expected: std::any::type_name::<T>(),
        found: format!("{}({found})", found.kind_name()),
    })
}

/// Drain `cursor` into records of type `T`.
///
/// Column names are captured from the cursor when the first row arrives.
///
/// # Errors
/// Returns the cursor's error, or `DbClientError::MappingError` on the first cell that does
/// not fit its field.
pub fn map_cursor<T: FromDbRow>(cursor: &mut dyn RowCursor) -> Result<Vec<T>, DbClientError> {
    let mut items = Vec::new();
    let mut slots: Option<Vec<Option<usize>>> = None;
    while let Some(values) = cursor.next_row()? {
        let slots = slots.get_or_insert_with(|| field_slots::<T>(cursor.column_names()));
        items.push(map_row(slots, values)?);
    }
    Ok(items)
}

pub(crate) fn map_values<T, I>(columns: &[String], rows: I) -> Result<Vec<T>, DbClientError>
where
    T: FromDbRow,
    I: IntoIterator<Item = Vec<DbValue>>,
{
    let slots = field_slots::<T>(columns);
    rows.into_iter()
        .map(|values| map_row(&slots, values))
        .collect()
}

/// Column position for each entry of `T::FIELDS`.
fn field_slots<T: FromDbRow>(columns: &[String]) -> Vec<Option<usize>> {
    T::FIELDS
        .iter()
        .map(|field| columns.iter().position(|column| column == field))
        .collect()
}

fn map_row<T: FromDbRow>(
    slots: &[Option<usize>],
    mut values: Vec<DbValue>,
) -> Result<T, DbClientError> {
    let mut item = T::default();
    for (field, slot) in T::FIELDS.iter().zip(slots) {
        let Some(cell) = slot.and_then(|idx| values.get_mut(idx)) else {
            continue;
        };
        if cell.is_null() {
            continue;
        }
        item.set_field(field, std::mem::take(cell))?;
    }
    Ok(item)
}

impl FromDbValue for DbValue {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        Ok(value)
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_db_value(value).map(Some)
    }
}

macro_rules! impl_from_db_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromDbValue for $ty {
                fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
                    match value {
                        DbValue::Int(i) => <$ty>::try_from(i).map_err(|_| DbValue::Int(i)),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_db_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromDbValue for f64 {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        value.as_float().ok_or(value)
    }
}

impl FromDbValue for String {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        match value {
            DbValue::Text(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        match value {
            DbValue::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

// Text is never parsed; declare the field as `String` or `DbValue` to read stored text.
impl FromDbValue for NaiveDateTime {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        match value {
            DbValue::Timestamp(dt) => Ok(dt),
            other => Err(other),
        }
    }
}

impl FromDbValue for JsonValue {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        match value {
            DbValue::Json(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FromDbValue for Vec<u8> {
    fn from_db_value(value: DbValue) -> Result<Self, DbValue> {
        match value {
            DbValue::Blob(bytes) => Ok(bytes),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BufferedCursor;
    use crate::db_record;

    db_record! {
        #[derive(Debug, Default, PartialEq)]
        struct Person {
            name: String,
            age: i64,
        }
    }

    db_record! {
        #[derive(Debug, Default, PartialEq)]
        struct Wide {
            id: i32,
            active: bool,
            nickname: Option<String>,
            raw: DbValue,
            unmatched: u8,
        }
    }

    fn cursor(columns: &[&str], rows: Vec<Vec<DbValue>>) -> BufferedCursor {
        BufferedCursor::new(columns.iter().map(|c| (*c).to_string()).collect(), rows)
    }

    #[test]
    fn maps_two_rows_with_null_default() {
        let mut cursor = cursor(
            &["name", "age"],
            vec![
                vec![DbValue::Text("A".into()), DbValue::Int(5)],
                vec![DbValue::Text("B".into()), DbValue::Null],
            ],
        );
        let people: Vec<Person> = map_cursor(&mut cursor).unwrap();
        assert_eq!(
            people,
            vec![
                Person { name: "A".into(), age: 5 },
                Person { name: "B".into(), age: 0 },
            ]
        );
    }

    #[test]
    fn zero_rows_map_to_empty() {
        let mut cursor = cursor(&["name", "age"], vec![]);
        let people: Vec<Person> = map_cursor(&mut cursor).unwrap();
        assert!(people.is_empty());
    }

    #[test]
    fn names_match_case_sensitively_and_extra_columns_are_ignored() {
        let mut cursor = cursor(
            &["Name", "age", "extra"],
            vec![vec![DbValue::Text("A".into()), DbValue::Int(7), DbValue::Int(1)]],
        );
        let people: Vec<Person> = map_cursor(&mut cursor).unwrap();
        assert_eq!(people, vec![Person { name: String::new(), age: 7 }]);
    }

    #[test]
    fn representation_conversions() {
        let mut cursor = cursor(
            &["id", "active", "nickname", "raw"],
            vec![
                vec![
                    DbValue::Int(12),
                    DbValue::Bool(true),
                    DbValue::Text("x".into()),
                    DbValue::Float(1.5),
                ],
                vec![DbValue::Int(13), DbValue::Bool(false), DbValue::Null, DbValue::Null],
            ],
        );
        let rows: Vec<Wide> = map_cursor(&mut cursor).unwrap();
        assert_eq!(rows[0].id, 12);
        assert!(rows[0].active);
        assert_eq!(rows[0].nickname.as_deref(), Some("x"));
        assert_eq!(rows[0].raw, DbValue::Float(1.5));
        assert_eq!(rows[1].nickname, None);
        assert_eq!(rows[1].raw, DbValue::Null);
        assert_eq!(rows[1].unmatched, 0);
    }

    #[test]
    fn type_mismatch_is_a_mapping_error() {
        let mut cursor = cursor(
            &["name", "age"],
            vec![vec![DbValue::Text("A".into()), DbValue::Text("five".into())]],
        );
        let err = map_cursor::<Person>(&mut cursor).unwrap_err();
        match err {
            DbClientError::MappingError {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, "i64");
                assert_eq!(found, "Text(five)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_integer_is_a_mapping_error() {
        let mut cursor = cursor(&["id"], vec![vec![DbValue::Int(i64::from(i32::MAX) + 1)]]);
        assert!(matches!(
            map_cursor::<Wide>(&mut cursor),
            Err(DbClientError::MappingError { .. })
        ));
    }

    #[test]
    fn no_coercion_between_representations() {
        let text = DbValue::Text(r#"{"a":1}"#.into());
        assert_eq!(JsonValue::from_db_value(text.clone()), Err(text));
        let json = serde_json::json!({"a": 1});
        assert_eq!(JsonValue::from_db_value(DbValue::Json(json.clone())), Ok(json));

        let stamp = DbValue::Text("2024-03-01 12:30:00".into());
        assert_eq!(NaiveDateTime::from_db_value(stamp.clone()), Err(stamp));
        assert_eq!(bool::from_db_value(DbValue::Int(1)), Err(DbValue::Int(1)));
        assert_eq!(bool::from_db_value(DbValue::Bool(false)), Ok(false));
    }

    #[test]
    fn integer_flag_into_bool_is_a_mapping_error() {
        let mut cursor = cursor(&["id", "active"], vec![vec![DbValue::Int(1), DbValue::Int(1)]]);
        match map_cursor::<Wide>(&mut cursor) {
            Err(DbClientError::MappingError { field, expected, found }) => {
                assert_eq!(field, "active");
                assert_eq!(expected, "bool");
                assert_eq!(found, "Int(1)");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
