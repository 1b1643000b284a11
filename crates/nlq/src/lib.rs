#![forbid(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod guardrail;
pub mod models;
pub mod sqlite;
pub mod translate;
pub mod utils;

pub use cli::app::{Cli, Command};
pub use config::{ConfigError, SqlDialect, TranslatorConfig};
pub use models::{TranslatedQuery, Translation};
pub use translate::{GuardedTranslator, SqlTranslator, Translator, suggestions};
