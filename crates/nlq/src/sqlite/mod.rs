use std::path::Path;

use anyhow::{Context, Error, Result};
use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;
use serde_json::{Value, json};

/// DDL for every table in [`crate::catalog::SchemaCatalog::analytics`], same column order.
const CREATE_ANALYTICS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS workspaces (
    id TEXT NOT NULL PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    plan TEXT NOT NULL DEFAULT 'free',
    status TEXT NOT NULL DEFAULT 'active'
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT NOT NULL PRIMARY KEY,
    email TEXT NOT NULL,
    name TEXT NOT NULL,
    workspace_id TEXT REFERENCES workspaces(id),
    role TEXT NOT NULL DEFAULT 'member',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS agents (
    id TEXT NOT NULL PRIMARY KEY,
    workspace_id TEXT REFERENCES workspaces(id),
    name TEXT NOT NULL,
    language TEXT NOT NULL DEFAULT 'en',
    llm_model TEXT NOT NULL DEFAULT 'gpt-4',
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS integrations (
    id TEXT NOT NULL PRIMARY KEY,
    workspace_id TEXT REFERENCES workspaces(id),
    type TEXT NOT NULL,
    config TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    last_sync_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS agent_tools (
    id TEXT NOT NULL PRIMARY KEY,
    agent_id TEXT REFERENCES agents(id),
    tool_name TEXT NOT NULL,
    tool_config TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS agent_runs (
    id TEXT NOT NULL PRIMARY KEY,
    agent_id TEXT REFERENCES agents(id),
    workspace_id TEXT REFERENCES workspaces(id),
    run_type TEXT NOT NULL DEFAULT 'test_call',
    status TEXT NOT NULL DEFAULT 'success',
    duration_ms INTEGER,
    started_at TEXT NOT NULL DEFAULT (datetime('now')),
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS test_runs (
    id TEXT NOT NULL PRIMARY KEY,
    agent_id TEXT REFERENCES agents(id),
    workspace_id TEXT REFERENCES workspaces(id),
    test_input TEXT,
    expected_output TEXT,
    actual_output TEXT,
    result TEXT NOT NULL DEFAULT 'pass',
    error_message TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS run_logs (
    id TEXT NOT NULL PRIMARY KEY,
    run_id TEXT REFERENCES agent_runs(id),
    step INTEGER,
    event_type TEXT,
    message TEXT,
    payload TEXT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS errors (
    id TEXT NOT NULL PRIMARY KEY,
    run_id TEXT REFERENCES agent_runs(id),
    workspace_id TEXT REFERENCES workspaces(id),
    source TEXT,
    code TEXT,
    message TEXT,
    metadata TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS integration_sync_logs (
    id TEXT NOT NULL PRIMARY KEY,
    integration_id TEXT REFERENCES integrations(id),
    workspace_id TEXT REFERENCES workspaces(id),
    sync_type TEXT,
    status TEXT NOT NULL DEFAULT 'success',
    items_synced INTEGER,
    error_message TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS billing_usage (
    id TEXT NOT NULL PRIMARY KEY,
    workspace_id TEXT REFERENCES workspaces(id),
    agent_id TEXT REFERENCES agents(id),
    characters_generated INTEGER,
    calls_made INTEGER,
    tokens_used INTEGER,
    total_cost_usd REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS audit_events (
    id TEXT NOT NULL PRIMARY KEY,
    workspace_id TEXT REFERENCES workspaces(id),
    user_id TEXT REFERENCES users(id),
    action TEXT,
    entity TEXT,
    "before" TEXT,
    "after" TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_errors_created_at ON errors(created_at);
CREATE INDEX IF NOT EXISTS idx_test_runs_result_created_at ON test_runs(result, created_at);
"#;

pub fn open_sqlite_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create sqlite parent directory: {}",
                parent.display()
            )
        })?;
    }

    Connection::open(path)
        .with_context(|| format!("failed to open sqlite database: {}", path.display()))
}

/// Creates the demo analytics tables; safe to call on an initialized database.
pub fn ensure_analytics_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(CREATE_ANALYTICS_SCHEMA_SQL)
        .context("failed to create analytics schema")
}

pub fn table_columns(connection: &Connection, table: &str) -> Result<Vec<String>> {
    let pragma_sql = format!("PRAGMA table_info('{}')", table.replace('\'', "''"));
    let mut statement = connection
        .prepare(&pragma_sql)
        .with_context(|| format!("failed to prepare column introspection for `{table}`"))?;

    let column_rows = statement
        .query_map([], |row| row.get::<usize, String>(1))
        .with_context(|| format!("failed to execute column introspection for `{table}`"))?;

    column_rows
        .map(|row| row.context("failed to decode table column row"))
        .collect()
}

#[derive(Debug)]
pub struct QueryExecutionResult {
    pub column_names: Vec<String>,
    pub rows: Vec<Value>,
    pub row_count: usize,
    pub truncated: bool,
}

pub fn execute_read_only_query(
    connection: &Connection,
    sql: &str,
    row_cap: usize,
) -> Result<QueryExecutionResult> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|error| Error::new(error).context("failed to prepare query"))?;
    if !statement.readonly() {
        anyhow::bail!("refusing to execute a statement that writes to the database");
    }
    let column_names = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut rows = statement
        .query([])
        .map_err(|error| Error::new(error).context("failed to execute query"))?;
    let mut result_rows = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows
        .next()
        .map_err(|error| Error::new(error).context("failed to fetch query row"))?
    {
        if result_rows.len() >= row_cap {
            truncated = true;
            break;
        }

        let mut record = serde_json::Map::new();
        for (index, column_name) in column_names.iter().enumerate() {
            let value = row
                .get::<usize, SqlValue>(index)
                .map_err(|error| Error::new(error).context("failed to decode query column"))?;
            record.insert(column_name.clone(), json_value_from_sql(value));
        }
        result_rows.push(Value::Object(record));
    }

    Ok(QueryExecutionResult {
        column_names,
        row_count: result_rows.len(),
        rows: result_rows,
        truncated,
    })
}

fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => json!(value),
        SqlValue::Blob(value) => json!(encode_blob_hex(&value)),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}
