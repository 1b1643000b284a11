use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::translate::no_match_envelope;
use super::{build_translator, print_envelope};
use crate::config::{RuntimePaths, SqlDialect};
use crate::guardrail::validate_read_only_sql;
use crate::models::{QueryEnvelope, Translation};
use crate::sqlite::{execute_read_only_query, open_sqlite_connection};
use crate::utils::time::{classify_latency_bucket, elapsed_ms};

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[arg(value_name = "QUESTION")]
    pub question: String,

    #[arg(long, default_value_t = 1_000)]
    pub row_cap: usize,
}

pub fn run(args: &QueryArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    if args.row_cap == 0 {
        return Err(QueryEnvelope::error(
            "query",
            "query_row_cap_invalid",
            "row_cap must be greater than zero",
        )
        .with_error_details(json!({ "row_cap": args.row_cap }))
        .into_failure());
    }

    // Execution goes through rusqlite, so time windows must use SQLite syntax.
    let translator = build_translator(runtime_paths, Some(SqlDialect::Sqlite))?;
    let query = match translator.translate(&args.question) {
        Translation::Translated(query) => query,
        Translation::NoMatch { reason } => {
            return Err(no_match_envelope("query", &args.question, &reason).into_failure());
        }
    };

    if let Err(violation) = validate_read_only_sql(&query.sql) {
        return Err(QueryEnvelope::error(
            "query",
            "sql_guardrail_violation",
            &violation.message,
        )
        .with_meta("rule", json!(query.rule))
        .with_error_details(violation.details)
        .into_failure());
    }

    if !runtime_paths.database.is_file() {
        return Err(QueryEnvelope::error(
            "query",
            "query_database_missing",
            "database not found; run `nlq init` or pass --db",
        )
        .with_error_details(json!({
            "database": runtime_paths.database.display().to_string()
        }))
        .into_failure());
    }

    let connection = open_sqlite_connection(&runtime_paths.database).map_err(|error| {
        QueryEnvelope::error(
            "query",
            "query_database_unavailable",
            "unable to open sqlite database",
        )
        .with_error_details(json!({
            "database": runtime_paths.database.display().to_string(),
            "cause": format!("{error:#}")
        }))
        .into_failure()
    })?;

    let started = std::time::Instant::now();
    let result = execute_read_only_query(&connection, &query.sql, args.row_cap).map_err(|error| {
        QueryEnvelope::error("query", "query_execution_failed", "query execution failed")
            .with_meta("sql", json!(query.sql))
            .with_meta("duration_ms", json!(elapsed_ms(started)))
            .with_error_details(json!({ "cause": format!("{error:#}") }))
            .into_failure()
    })?;
    let duration_ms = elapsed_ms(started);

    let mut envelope = QueryEnvelope::ok(
        "query",
        json!({
            "question": args.question,
            "sql": query.sql,
            "explanation": query.explanation,
            "rule": query.rule,
            "columns": result.column_names,
            "rows": result.rows,
        }),
    )
    .with_meta("row_count", json!(result.row_count))
    .with_meta("truncated", json!(result.truncated))
    .with_meta("row_cap", json!(args.row_cap))
    .with_meta("duration_ms", json!(duration_ms))
    .with_meta("latency_bucket", json!(classify_latency_bucket(duration_ms)));
    if result.truncated {
        envelope = envelope.with_warning(
            "row_cap_reached",
            format!("result truncated to {} rows", args.row_cap),
        );
    }

    print_envelope(&envelope)
}
