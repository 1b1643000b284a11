pub mod catalog;
pub mod init;
pub mod query;
pub mod schema;
pub mod suggest;
pub mod translate;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::config::{RuntimePaths, SqlDialect};
use crate::models::QueryEnvelope;
use crate::translate::Translator;

pub const NO_MATCH_ERROR_CODE: &str = "question_not_understood";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Sqlite,
    Postgres,
}

impl From<DialectArg> for SqlDialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Sqlite => Self::Sqlite,
            DialectArg::Postgres => Self::Postgres,
        }
    }
}

pub(crate) fn build_translator(
    runtime_paths: &RuntimePaths,
    dialect: Option<SqlDialect>,
) -> Result<Translator> {
    let mut config = runtime_paths.load_translator_config()?;
    if let Some(dialect) = dialect {
        config = config.with_dialect(dialect);
    }
    Translator::new(config).context("invalid translator configuration")
}

pub(crate) fn print_envelope(envelope: &QueryEnvelope) -> Result<()> {
    let encoded = serde_json::to_string(envelope).context("failed to encode command output")?;
    println!("{encoded}");
    Ok(())
}
