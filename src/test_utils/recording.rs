//! A driver that talks to no engine: it records every call and replays scripted results.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapter::{BufferedCursor, DriverAdapter, DriverConnection, ReaderVisitor};
use crate::command::Command;
use crate::error::DbClientError;
use crate::params::Parameter;
use crate::types::{CommandKind, DbType, DbValue, IsolationLevel};

/// One call observed by the recording driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Open,
    Close,
    Begin(IsolationLevel),
    Commit,
    Rollback,
    Reader(ExecutedCommand),
    NonQuery(ExecutedCommand),
}

/// A command as the driver saw it at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCommand {
    pub text: String,
    pub kind: CommandKind,
    pub in_transaction: bool,
    pub parameters: Vec<(String, DbValue)>,
}

impl ExecutedCommand {
    fn capture(command: &Command) -> Self {
        Self {
            text: command.text().to_string(),
            kind: command.kind(),
            in_transaction: command.transaction().is_some(),
            parameters: command
                .parameters()
                .iter()
                .map(|p| (p.name().to_string(), p.value().clone()))
                .collect(),
        }
    }

    /// Value the driver received for `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&DbValue> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Operations that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Open,
    Close,
    Begin,
    Commit,
    Rollback,
    Execute,
}

#[derive(Debug, Default)]
struct RecorderState {
    events: Vec<DriverEvent>,
    row_sets: VecDeque<(Vec<String>, Vec<Vec<DbValue>>)>,
    affected: VecDeque<i64>,
    outputs: Vec<(String, DbValue)>,
    failures: Vec<(FailPoint, String)>,
}

impl RecorderState {
    fn take_failure(&mut self, point: FailPoint) -> Option<String> {
        let idx = self.failures.iter().position(|(p, _)| *p == point)?;
        Some(self.failures.remove(idx).1)
    }
}

/// Scripted in-memory adapter. Clones share the same script and journal, so a test can keep
/// one clone while the provider owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingAdapter {
    state: Arc<Mutex<RecorderState>>,
}

impl RecordingAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecorderState> {
        lock(&self.state)
    }

    /// Queue a result for the next reader execution.
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<DbValue>>) {
        let columns = columns.iter().map(|c| (*c).to_string()).collect();
        self.state().row_sets.push_back((columns, rows));
    }

    /// Queue an affected-row count for the next non-query execution.
    pub fn push_affected(&self, count: i64) {
        self.state().affected.push_back(count);
    }

    /// Value written back to output parameters named `name` after each execution.
    pub fn set_output(&self, name: &str, value: impl Into<DbValue>) {
        self.state().outputs.push((name.to_string(), value.into()));
    }

    /// Make the next call of `point` fail with `message`.
    pub fn fail_next(&self, point: FailPoint, message: &str) {
        self.state().failures.push((point, message.to_string()));
    }

    #[must_use]
    pub fn events(&self) -> Vec<DriverEvent> {
        self.state().events.clone()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Every executed command, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                DriverEvent::Reader(cmd) | DriverEvent::NonQuery(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn last_executed(&self) -> Option<ExecutedCommand> {
        self.executed().pop()
    }
}

impl DriverAdapter for RecordingAdapter {
    type Connection = RecordingConnection;

    fn create_connection(&self, connection_string: &str) -> Result<RecordingConnection, DbClientError> {
        if connection_string.trim().is_empty() {
            return Err(DbClientError::ConfigError("empty connection string".into()));
        }
        Ok(RecordingConnection {
            state: Arc::clone(&self.state),
            open: false,
        })
    }

    fn bind_type(&self, parameter: &mut Parameter, db_type: DbType) {
        parameter.bind_type(db_type, db_type.as_str());
    }
}

/// Connection half of [`RecordingAdapter`].
#[derive(Debug)]
pub struct RecordingConnection {
    state: Arc<Mutex<RecorderState>>,
    open: bool,
}

impl RecordingConnection {
    fn record(&self, event: DriverEvent) {
        lock(&self.state).events.push(event);
    }

    fn check(&self, point: FailPoint) -> Result<(), DbClientError> {
        match lock(&self.state).take_failure(point) {
            Some(message) => Err(DbClientError::ExecutionError(message)),
            None => Ok(()),
        }
    }

    fn ensure_open(&self) -> Result<(), DbClientError> {
        if self.open {
            Ok(())
        } else {
            Err(DbClientError::ConnectionError("connection is closed".into()))
        }
    }

    fn write_outputs(&self, command: &mut Command) {
        let outputs = lock(&self.state).outputs.clone();
        for (name, value) in outputs {
            if let Ok(parameter) = command.parameters_mut().get_mut(name.as_str())
                && parameter.direction().is_output()
            {
                parameter.set_value(value);
            }
        }
    }
}

impl DriverConnection for RecordingConnection {
    fn open(&mut self) -> Result<(), DbClientError> {
        if self.open {
            return Ok(());
        }
        if let Some(message) = lock(&self.state).take_failure(FailPoint::Open) {
            return Err(DbClientError::ConnectionError(message));
        }
        self.open = true;
        self.record(DriverEvent::Open);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DbClientError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.record(DriverEvent::Close);
        if let Some(message) = lock(&self.state).take_failure(FailPoint::Close) {
            return Err(DbClientError::ConnectionError(message));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), DbClientError> {
        self.ensure_open()?;
        self.check(FailPoint::Begin)?;
        self.record(DriverEvent::Begin(isolation));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DbClientError> {
        self.ensure_open()?;
        self.record(DriverEvent::Commit);
        self.check(FailPoint::Commit)
    }

    fn rollback(&mut self) -> Result<(), DbClientError> {
        self.ensure_open()?;
        self.record(DriverEvent::Rollback);
        self.check(FailPoint::Rollback)
    }

    fn execute_reader(
        &mut self,
        command: &mut Command,
        visit: &mut ReaderVisitor<'_>,
    ) -> Result<(), DbClientError> {
        self.ensure_open()?;
        self.record(DriverEvent::Reader(ExecutedCommand::capture(command)));
        self.check(FailPoint::Execute)?;
        let (columns, rows) = lock(&self.state).row_sets.pop_front().unwrap_or_default();
        self.write_outputs(command);
        let mut cursor = BufferedCursor::new(columns, rows);
        visit(&mut cursor)
    }

    fn execute_non_query(&mut self, command: &mut Command) -> Result<i64, DbClientError> {
        self.ensure_open()?;
        self.record(DriverEvent::NonQuery(ExecutedCommand::capture(command)));
        self.check(FailPoint::Execute)?;
        let affected = lock(&self.state).affected.pop_front().unwrap_or(0);
        self.write_outputs(command);
        Ok(affected)
    }
}

fn lock(state: &Mutex<RecorderState>) -> MutexGuard<'_, RecorderState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
