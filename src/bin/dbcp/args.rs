use std::str::FromStr;

use clap::{Parser, ValueEnum};
use db_client_provider::{DbType, IsolationLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    Table,
    Scalar,
    NonQuery,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one statement through a db-client-provider")]
pub(crate) struct Args {
    /// Connection string: a database path or `Data Source=...;` pairs.
    #[arg(long, env = "DBCP_CONNECTION")]
    pub(crate) connection: String,
    #[arg(long, value_enum, default_value = "table")]
    pub(crate) mode: Mode,
    /// `name=value` or `name:type=value`; an empty value binds NULL.
    #[arg(long = "param", value_name = "NAME[:TYPE]=VALUE")]
    pub(crate) params: Vec<ParamArg>,
    /// Run the statement inside a transaction.
    #[arg(long)]
    pub(crate) transaction: bool,
    #[arg(long, value_enum, requires = "transaction")]
    pub(crate) isolation: Option<IsolationLevel>,
    /// Roll the transaction back instead of committing it.
    #[arg(long, requires = "transaction")]
    pub(crate) rollback: bool,
    /// Treat the statement as a stored procedure name.
    #[arg(long)]
    pub(crate) procedure: bool,
    /// Pretty-print JSON output.
    #[arg(long)]
    pub(crate) pretty: bool,
    pub(crate) sql: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamArg {
    pub(crate) name: String,
    pub(crate) db_type: Option<DbType>,
    pub(crate) value: String,
}

impl FromStr for ParamArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME[:TYPE]=VALUE, got `{s}`"))?;
        let (name, db_type) = match head.split_once(':') {
            Some((name, ty)) => (name, Some(<DbType as ValueEnum>::from_str(ty, true)?)),
            None => (head, None),
        };
        if name.is_empty() {
            return Err(format!("parameter name missing in `{s}`"));
        }
        Ok(Self {
            name: name.to_string(),
            db_type,
            value: value.to_string(),
        })
    }
}
