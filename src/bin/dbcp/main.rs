mod args;

use std::process::ExitCode;

use clap::Parser;
use db_client_provider::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Mode};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(output) => {
            let rendered = if args.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            };
            match rendered {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("failed to render output: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<serde_json::Value, DbClientError> {
    let mut provider = DbClientProvider::sqlite(args.connection.as_str())?;
    if args.procedure {
        provider.set_store_procedure(args.sql.as_str());
    } else {
        provider.set_sql_string(args.sql.as_str());
    }
    for param in &args.params {
        provider.add_typed_parameter(
            param.name.as_str(),
            param.db_type,
            None,
            param.value.as_str(),
        )?;
    }

    if args.transaction {
        provider.begin_transaction_with(args.isolation.unwrap_or_default())?;
    }
    let outcome = execute(&mut provider, args.mode);
    if args.transaction {
        return end_transaction(&mut provider, args.rollback, outcome);
    }
    outcome
}

/// Commit or roll back after the statement ran. A failed statement never commits, and its
/// error is the one reported even when the rollback fails too.
fn end_transaction<A: DriverAdapter, T>(
    provider: &mut DbClientProvider<A>,
    rollback: bool,
    outcome: Result<T, DbClientError>,
) -> Result<T, DbClientError> {
    match outcome {
        Ok(value) => {
            if rollback {
                provider.rollback_transaction()?;
            } else {
                provider.commit_transaction()?;
            }
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = provider.rollback_transaction() {
                tracing::warn!(error = %rollback_err, "rollback after failed statement failed");
            }
            Err(err)
        }
    }
}

fn execute(provider: &mut SqliteProvider, mode: Mode) -> Result<serde_json::Value, DbClientError> {
    let output = match mode {
        Mode::Table => {
            let table = provider.execute_as_table()?;
            tracing::info!(rows = table.len(), "query returned");
            json!(table)
        }
        Mode::Scalar => json!(provider.execute_scalar()?),
        Mode::NonQuery => json!({ "affected": provider.execute_non_query()? }),
    };
    Ok(output)
}
