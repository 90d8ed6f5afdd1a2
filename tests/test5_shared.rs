#![cfg(feature = "sqlite")]

use std::thread;

use db_client_provider::prelude::*;
use db_client_provider::test_utils::RecordingAdapter;

#[test]
fn threads_serialize_through_the_lock() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shared.db").display().to_string();
    let provider = DbClientProvider::sqlite(path)?;
    provider
        .connection()
        .execute_batch("CREATE TABLE hits (worker INTEGER, n INTEGER);")?;
    let shared = SharedProvider::new(provider);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || -> Result<(), DbClientError> {
                for n in 0..10 {
                    shared.with(|p| -> Result<(), DbClientError> {
                        p.clear_parameters();
                        p.set_sql_string("INSERT INTO hits VALUES (:worker, :n)");
                        p.add_parameter("worker", worker)?;
                        p.add_parameter("n", n)?;
                        p.execute_non_query().map(|_| ())
                    })?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().map_err(|_| "worker panicked")??;
    }

    let total = shared.with(|p| {
        p.clear_parameters();
        p.set_sql_string("SELECT count(*) FROM hits");
        p.execute_scalar()
    })?;
    assert_eq!(total, DbValue::Int(40));
    Ok(())
}

#[test]
fn transaction_inside_one_closure() -> Result<(), Box<dyn std::error::Error>> {
    let adapter = RecordingAdapter::new();
    let shared = SharedProvider::new(DbClientProvider::new(adapter.clone(), "recording://shared")?);
    shared.with(|p| -> Result<(), DbClientError> {
        p.begin_transaction()?;
        p.set_sql_string("UPDATE t SET x = 1");
        p.execute_non_query()?;
        p.commit_transaction()
    })?;
    assert!(!shared.with(|p| p.is_connection_open()));
    assert!(adapter.last_executed().ok_or("nothing executed")?.in_transaction);
    Ok(())
}

#[test]
fn poisoned_lock_is_recovered() -> Result<(), Box<dyn std::error::Error>> {
    let shared = SharedProvider::new(DbClientProvider::new(
        RecordingAdapter::new(),
        "recording://poison",
    )?);
    let clone = shared.clone();
    let joined = thread::spawn(move || {
        clone.with(|_| panic!("worker failed"));
    })
    .join();
    assert!(joined.is_err());
    assert!(shared.with(|p| p.is_connection_open()));
    Ok(())
}
