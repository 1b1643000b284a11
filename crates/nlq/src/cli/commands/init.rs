use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::print_envelope;
use crate::catalog::SchemaCatalog;
use crate::config::RuntimePaths;
use crate::models::QueryEnvelope;
use crate::sqlite::{ensure_analytics_schema, open_sqlite_connection, table_columns};

#[derive(Debug, Clone, Args)]
pub struct InitArgs {}

pub fn run(_args: &InitArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    eprintln!("init: start database={}", runtime_paths.database.display());

    let connection = open_sqlite_connection(&runtime_paths.database)?;
    ensure_analytics_schema(&connection)?;

    let tables = SchemaCatalog::analytics()
        .table_names()
        .map(|table| {
            let columns = table_columns(&connection, table)?;
            Ok(json!({ "name": table, "columns": columns }))
        })
        .collect::<Result<Vec<_>>>()?;

    let envelope = QueryEnvelope::ok(
        "init",
        json!({
            "database": runtime_paths.database.display().to_string(),
            "tables": tables,
        }),
    );
    print_envelope(&envelope)
}
