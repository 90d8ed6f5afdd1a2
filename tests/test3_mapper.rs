use chrono::NaiveDate;
use db_client_provider::prelude::*;
use db_client_provider::test_utils::{RecordingAdapter, create_test_cursor};

db_record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: i64,
    }
}

db_record! {
    #[derive(Debug, Default, PartialEq)]
    struct Event {
        id: i32,
        at: Option<chrono::NaiveDateTime>,
        active: bool,
        payload: serde_json::Value,
        untouched: String,
    }
}

fn provider() -> Result<(RecordingAdapter, DbClientProvider<RecordingAdapter>), DbClientError> {
    let adapter = RecordingAdapter::new();
    let mut provider = DbClientProvider::new(adapter.clone(), "recording://mapper")?;
    provider.set_sql_string("SELECT name, age FROM people");
    Ok((adapter, provider))
}

#[test]
fn two_rows_with_null_default() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(
        &["name", "age"],
        vec![
            vec![DbValue::Text("A".into()), DbValue::Int(5)],
            vec![DbValue::Text("B".into()), DbValue::Null],
        ],
    );
    let people: Vec<Person> = provider.execute_as_mapper()?;
    assert_eq!(
        people,
        vec![
            Person { name: "A".into(), age: 5 },
            Person { name: "B".into(), age: 0 },
        ]
    );
    Ok(())
}

#[test]
fn zero_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(&["name", "age"], Vec::new());
    assert!(provider.execute_as_mapper::<Person>()?.is_empty());
    adapter.push_rows(&["name", "age"], Vec::new());
    assert_eq!(provider.execute_as_mapper_single::<Person>()?, None);
    Ok(())
}

#[test]
fn single_keeps_the_first_record() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(
        &["name", "age"],
        vec![
            vec![DbValue::Text("first".into()), DbValue::Int(1)],
            vec![DbValue::Text("second".into()), DbValue::Int(2)],
        ],
    );
    let person = provider.execute_as_mapper_single::<Person>()?.ok_or("no record")?;
    assert_eq!(person.name, "first");
    Ok(())
}

#[test]
fn names_match_exactly_and_extras_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(
        &["NAME", "age", "extra"],
        vec![vec![
            DbValue::Text("ignored".into()),
            DbValue::Int(9),
            DbValue::Float(1.5),
        ]],
    );
    let people: Vec<Person> = provider.execute_as_mapper()?;
    assert_eq!(people, vec![Person { name: String::new(), age: 9 }]);
    Ok(())
}

#[test]
fn type_mismatch_is_a_mapping_error() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(
        &["name", "age"],
        vec![vec![DbValue::Text("A".into()), DbValue::Text("five".into())]],
    );
    match provider.execute_as_mapper::<Person>() {
        Err(DbClientError::MappingError { field, expected, found }) => {
            assert_eq!(field, "age");
            assert_eq!(expected, "i64");
            assert!(found.contains("five"), "{found}");
        }
        other => panic!("expected mapping error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn richer_field_types() -> Result<(), Box<dyn std::error::Error>> {
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .ok_or("bad date")?;
    let mut cursor = create_test_cursor(
        &["id", "at", "active", "payload"],
        vec![
            vec![
                DbValue::Int(7),
                DbValue::Timestamp(at),
                DbValue::Bool(true),
                DbValue::Json(serde_json::json!({"k": [1, 2]})),
            ],
            vec![DbValue::Int(8), DbValue::Null, DbValue::Bool(false), DbValue::Null],
        ],
    );
    let events: Vec<Event> = map_cursor(&mut cursor)?;
    assert_eq!(events[0].id, 7);
    assert_eq!(events[0].at, Some(at));
    assert!(events[0].active);
    assert_eq!(events[0].payload, serde_json::json!({"k": [1, 2]}));
    assert_eq!(events[1], Event { id: 8, ..Event::default() });
    Ok(())
}

#[test]
fn text_and_integers_are_not_coerced() {
    let cases = [
        ("at", DbValue::Text("2024-03-01 12:30:00".into())),
        ("active", DbValue::Int(1)),
        ("payload", DbValue::Text("[1,2]".into())),
    ];
    for (column, cell) in cases {
        let mut cursor = create_test_cursor(&[column], vec![vec![cell]]);
        match map_cursor::<Event>(&mut cursor) {
            Err(DbClientError::MappingError { field, .. }) => assert_eq!(field, column),
            other => panic!("{column}: expected mapping error, got {other:?}"),
        }
    }
}

#[test]
fn table_rows_map_the_same_way() -> Result<(), Box<dyn std::error::Error>> {
    let (adapter, mut provider) = provider()?;
    adapter.push_rows(
        &["name", "age"],
        vec![
            vec![DbValue::Text("A".into()), DbValue::Int(5)],
            vec![DbValue::Text("B".into()), DbValue::Null],
        ],
    );
    let table = provider.execute_as_table()?;
    assert_eq!(table.columns(), ["name", "age"]);
    assert_eq!(table.cell(1, "age"), Some(&DbValue::Null));
    let people: Vec<Person> = table.map_rows()?;
    assert_eq!(people[1], Person { name: "B".into(), age: 0 });
    Ok(())
}
