use std::time::Duration;

use crate::error::DbClientError;

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub db_path: String,
    pub journal_mode: Option<String>,
    pub busy_timeout: Option<Duration>,
    pub foreign_keys: Option<bool>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            journal_mode: None,
            busy_timeout: None,
            foreign_keys: None,
        }
    }

    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Parse a connection string.
    ///
    /// A string without `=` is taken as the database path. Otherwise it is a `;`-separated
    /// list of `key=value` pairs; keys are case-insensitive and ignore spaces:
    /// `Data Source` (or `Filename`), `Journal Mode`, `Busy Timeout` (milliseconds),
    /// `Foreign Keys`.
    ///
    /// # Errors
    /// Returns `DbClientError::ConfigError` for unknown keys, bad values or a missing path.
    pub fn parse(connection_string: &str) -> Result<Self, DbClientError> {
        let trimmed = connection_string.trim();
        if !trimmed.contains('=') {
            if trimmed.is_empty() {
                return Err(DbClientError::ConfigError(
                    "SQLite connection string is empty".into(),
                ));
            }
            return Ok(Self::new(trimmed.to_string()));
        }

        let mut builder = SqliteOptionsBuilder::new(String::new());
        for pair in trimmed.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DbClientError::ConfigError(format!("expected key=value, got `{pair}`"))
            })?;
            let value = value.trim();
            let key: String = key
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            builder = match key.as_str() {
                "datasource" | "filename" => builder.db_path(value.to_string()),
                "journalmode" => builder.journal_mode(parse_journal_mode(value)?),
                "busytimeout" => {
                    let millis = value.parse::<u64>().map_err(|_| {
                        DbClientError::ConfigError(format!("invalid Busy Timeout `{value}`"))
                    })?;
                    builder.busy_timeout(Duration::from_millis(millis))
                }
                "foreignkeys" => builder.foreign_keys(parse_flag(value)?),
                _ => {
                    return Err(DbClientError::ConfigError(format!(
                        "unknown SQLite connection string key `{}`",
                        pair.split_once('=').map_or(pair, |(k, _)| k.trim())
                    )));
                }
            };
        }

        let opts = builder.finish();
        if opts.db_path.is_empty() {
            return Err(DbClientError::ConfigError(
                "SQLite connection string has no Data Source".into(),
            ));
        }
        Ok(opts)
    }
}

fn parse_journal_mode(value: &str) -> Result<String, DbClientError> {
    let upper = value.to_ascii_uppercase();
    if JOURNAL_MODES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(DbClientError::ConfigError(format!(
            "invalid Journal Mode `{value}`"
        )))
    }
}

fn parse_flag(value: &str) -> Result<bool, DbClientError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(DbClientError::ConfigError(format!(
            "invalid boolean `{value}`"
        ))),
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn db_path(mut self, db_path: String) -> Self {
        self.opts.db_path = db_path;
        self
    }

    #[must_use]
    pub fn journal_mode(mut self, journal_mode: String) -> Self {
        self.opts.journal_mode = Some(journal_mode);
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(busy_timeout);
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.opts.foreign_keys = Some(foreign_keys);
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path() {
        let opts = SqliteOptions::parse(" /tmp/app.db ").unwrap();
        assert_eq!(opts, SqliteOptions::new("/tmp/app.db".into()));
        assert_eq!(SqliteOptions::parse(":memory:").unwrap().db_path, ":memory:");
    }

    #[test]
    fn key_value_pairs() {
        let opts = SqliteOptions::parse(
            "Data Source=/tmp/app.db; journal mode=wal;Busy Timeout=250;Foreign Keys=true;",
        )
        .unwrap();
        assert_eq!(opts.db_path, "/tmp/app.db");
        assert_eq!(opts.journal_mode.as_deref(), Some("WAL"));
        assert_eq!(opts.busy_timeout, Some(Duration::from_millis(250)));
        assert_eq!(opts.foreign_keys, Some(true));

        let built = SqliteOptions::builder("/tmp/app.db".into())
            .journal_mode("WAL".into())
            .busy_timeout(Duration::from_millis(250))
            .foreign_keys(true)
            .finish();
        assert_eq!(opts, built);
    }

    #[test]
    fn rejects_bad_input() {
        for cs in [
            "",
            "Journal Mode=WAL",
            "Data Source=x.db;Journal Mode=fast",
            "Data Source=x.db;Busy Timeout=soon",
            "Data Source=x.db;Pooling=true",
            "Data Source=x.db;Foreign Keys=maybe",
        ] {
            assert!(
                matches!(SqliteOptions::parse(cs), Err(DbClientError::ConfigError(_))),
                "{cs}"
            );
        }
    }
}
