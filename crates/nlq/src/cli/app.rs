use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    catalog::CatalogArgs, init::InitArgs, query::QueryArgs, schema::SchemaArgs,
    suggest::SuggestArgs, translate::TranslateArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "nlq",
    version,
    about = "Offline natural-language-to-SQL for the agent analytics schema"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// SQLite database used by `query` and `init`.
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// JSON translator config (catalog, lexicon, dialect, fallback_row_limit).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Translate(TranslateArgs),
    Query(QueryArgs),
    Init(InitArgs),
    Suggest(SuggestArgs),
    Catalog(CatalogArgs),
    Schema(SchemaArgs),
}
