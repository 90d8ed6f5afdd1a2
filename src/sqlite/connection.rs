use std::fmt;
use std::thread;
use std::time::Duration;

use rusqlite::Connection;

use super::config::SqliteOptions;
use super::params::bind_parameters;
use super::query::SqliteCursor;
use crate::adapter::{DriverConnection, ReaderVisitor};
use crate::command::Command;
use crate::error::DbClientError;
use crate::types::{CommandKind, IsolationLevel};

const ROLLBACK_BUSY_RETRIES: &[Duration] = &[
    Duration::from_millis(10),
    Duration::from_millis(25),
    Duration::from_millis(50),
];

/// A `SQLite` connection that can be closed and reopened from the same options.
pub struct SqliteConnection {
    options: SqliteOptions,
    conn: Option<Connection>,
}

impl SqliteConnection {
    #[must_use]
    pub fn new(options: SqliteOptions) -> Self {
        Self {
            options,
            conn: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    /// The open rusqlite handle.
    ///
    /// # Errors
    /// Returns `DbClientError::ConnectionError` if the connection is closed.
    pub fn raw(&self) -> Result<&Connection, DbClientError> {
        self.conn
            .as_ref()
            .ok_or_else(|| DbClientError::ConnectionError("SQLite connection is closed".into()))
    }

    /// Run a batch of statements with no parameters and no result.
    ///
    /// # Errors
    /// Returns `DbClientError::SqliteError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbClientError> {
        self.raw()?.execute_batch(sql)?;
        Ok(())
    }

    fn apply_pragmas(&self, conn: &Connection) -> Result<(), DbClientError> {
        if let Some(timeout) = self.options.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        if let Some(enabled) = self.options.foreign_keys {
            conn.pragma_update(None, "foreign_keys", enabled)?;
        }
        if let Some(mode) = &self.options.journal_mode {
            // journal_mode answers with the mode actually in effect
            let applied: String =
                conn.query_row(&format!("PRAGMA journal_mode = {mode}"), [], |row| row.get(0))?;
            if !applied.eq_ignore_ascii_case(mode) {
                tracing::warn!(requested = %mode, applied = %applied, "journal mode not applied");
            }
        }
        Ok(())
    }

    fn rollback_with_busy_retries(conn: &Connection) -> Result<(), DbClientError> {
        retry_when_busy(ROLLBACK_BUSY_RETRIES, || conn.execute_batch("ROLLBACK"))
    }
}

/// Run `op`, sleeping and retrying after each delay while `SQLite` reports busy. The attempt
/// after the last delay returns whatever the driver says.
fn retry_when_busy(
    delays: &[Duration],
    mut op: impl FnMut() -> rusqlite::Result<()>,
) -> Result<(), DbClientError> {
    for (attempt, delay) in delays.iter().copied().enumerate() {
        match op() {
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                tracing::debug!(attempt = attempt + 1, "database busy, retrying");
                thread::sleep(delay);
            }
            other => return other.map_err(DbClientError::from),
        }
    }
    op()?;
    Ok(())
}

fn reject_procedure(command: &Command) -> Result<(), DbClientError> {
    if command.kind() == CommandKind::StoredProcedure {
        return Err(DbClientError::Unimplemented(format!(
            "SQLite has no stored procedures (`{}`)",
            command.text()
        )));
    }
    Ok(())
}

fn begin_statement(isolation: IsolationLevel) -> &'static str {
    match isolation {
        IsolationLevel::Serializable => "BEGIN IMMEDIATE",
        IsolationLevel::Unspecified
        | IsolationLevel::ReadUncommitted
        | IsolationLevel::ReadCommitted
        | IsolationLevel::RepeatableRead
        | IsolationLevel::Snapshot => "BEGIN DEFERRED",
    }
}

impl DriverConnection for SqliteConnection {
    fn open(&mut self) -> Result<(), DbClientError> {
        if self.conn.is_some() {
            return Ok(());
        }
        let conn = Connection::open(&self.options.db_path)?;
        self.apply_pragmas(&conn)?;
        tracing::trace!(path = %self.options.db_path, "sqlite connection opened");
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DbClientError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| err.into()),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), DbClientError> {
        let conn = self.raw()?;
        let read_uncommitted = isolation == IsolationLevel::ReadUncommitted;
        conn.pragma_update(None, "read_uncommitted", read_uncommitted)?;
        conn.execute_batch(begin_statement(isolation))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbClientError> {
        self.raw()?.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbClientError> {
        Self::rollback_with_busy_retries(self.raw()?)
    }

    fn execute_reader(
        &mut self,
        command: &mut Command,
        visit: &mut ReaderVisitor<'_>,
    ) -> Result<(), DbClientError> {
        reject_procedure(command)?;
        let conn = self.raw()?;
        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, command)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| (*name).to_string())
            .collect();
        let mut cursor = SqliteCursor::new(columns, stmt.raw_query());
        visit(&mut cursor)
    }

    fn execute_non_query(&mut self, command: &mut Command) -> Result<i64, DbClientError> {
        reject_procedure(command)?;
        let conn = self.raw()?;
        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, command)?;
        if stmt.column_count() > 0 {
            // row-returning statement: run it to completion, count unknown
            let mut rows = stmt.raw_query();
            while rows.next()?.is_some() {}
            return Ok(-1);
        }
        let affected = stmt.raw_execute()?;
        Ok(i64::try_from(affected).unwrap_or(i64::MAX))
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("options", &self.options)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RowCursor;
    use crate::params::Parameter;
    use crate::types::DbValue;

    fn memory() -> SqliteConnection {
        let mut conn = SqliteConnection::new(SqliteOptions::new(":memory:".into()));
        conn.open().unwrap();
        conn
    }

    #[test]
    fn reader_streams_rows() {
        let mut conn = memory();
        conn.execute_batch("CREATE TABLE t (id INTEGER, name TEXT); INSERT INTO t VALUES (1, 'a'), (2, NULL);")
            .unwrap();
        let mut command = Command::new().with_bind_by_name(true);
        command.set_text("SELECT id, name FROM t WHERE id >= :min ORDER BY id", CommandKind::Text);
        command.parameters_mut().add(Parameter::new("min", 1)).unwrap();

        let mut seen = Vec::new();
        conn.execute_reader(&mut command, &mut |cursor: &mut dyn RowCursor| {
            assert_eq!(cursor.column_names(), ["id", "name"]);
            while let Some(row) = cursor.next_row()? {
                seen.push(row);
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                vec![DbValue::Int(1), DbValue::Text("a".into())],
                vec![DbValue::Int(2), DbValue::Null],
            ]
        );
    }

    #[test]
    fn non_query_counts_and_select_reports_unknown() {
        let mut conn = memory();
        conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2), (3);")
            .unwrap();
        let mut command = Command::new();
        command.set_text("DELETE FROM t WHERE id > 1", CommandKind::Text);
        assert_eq!(conn.execute_non_query(&mut command).unwrap(), 2);
        command.set_text("SELECT * FROM t", CommandKind::Text);
        assert_eq!(conn.execute_non_query(&mut command).unwrap(), -1);
    }

    #[test]
    fn procedures_are_unimplemented() {
        let mut conn = memory();
        let mut command = Command::new();
        command.set_text("do_work", CommandKind::StoredProcedure);
        assert!(matches!(
            conn.execute_non_query(&mut command),
            Err(DbClientError::Unimplemented(_))
        ));
    }

    #[test]
    fn closed_connection_rejects_work() {
        let mut conn = memory();
        assert_eq!(conn.options().db_path, ":memory:");
        conn.close().unwrap();
        assert!(!conn.is_open());
        conn.close().unwrap();
        assert!(matches!(
            conn.begin(IsolationLevel::Unspecified),
            Err(DbClientError::ConnectionError(_))
        ));
    }

    fn busy() -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        )
    }

    #[test]
    fn busy_is_retried_until_the_last_attempt() {
        let delays = [Duration::ZERO, Duration::ZERO];

        let mut calls = 0;
        let result = retry_when_busy(&delays, || {
            calls += 1;
            if calls < 3 { Err(busy()) } else { Ok(()) }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);

        let mut calls = 0;
        let result = retry_when_busy(&delays, || {
            calls += 1;
            Err(busy())
        });
        assert!(matches!(result, Err(DbClientError::SqliteError(_))));
        assert_eq!(calls, 3);

        let mut calls = 0;
        let result = retry_when_busy(&delays, || {
            calls += 1;
            Err(rusqlite::Error::InvalidQuery)
        });
        assert!(matches!(result, Err(DbClientError::SqliteError(rusqlite::Error::InvalidQuery))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn isolation_maps_to_begin_mode() {
        assert_eq!(begin_statement(IsolationLevel::Serializable), "BEGIN IMMEDIATE");
        assert_eq!(begin_statement(IsolationLevel::ReadCommitted), "BEGIN DEFERRED");
        let mut conn = memory();
        conn.begin(IsolationLevel::ReadUncommitted).unwrap();
        let flag: i64 = conn
            .raw()
            .unwrap()
            .query_row("PRAGMA read_uncommitted", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flag, 1);
        conn.rollback().unwrap();
    }
}
