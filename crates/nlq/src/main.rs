#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use nlq::cli::app::{Cli, Command, RuntimeArgs};
use nlq::cli::commands;
use nlq::config::RuntimePaths;
use nlq::models::QueryEnvelopeCommandFailure;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_NOT_UNDERSTOOD: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();
    let command_name = command_name(&cli.command);
    eprintln!("nlq: starting `{command_name}`");

    match execute(cli) {
        Ok(()) => {
            eprintln!("nlq: completed `{command_name}` (exit_code={EXIT_SUCCESS})");
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("nlq: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NLQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Translate(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::translate::run(&args, &runtime_paths)
        }
        Command::Query(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::query::run(&args, &runtime_paths)
        }
        Command::Init(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::init::run(&args, &runtime_paths)
        }
        Command::Suggest(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::suggest::run(&args, &runtime_paths)
        }
        Command::Catalog(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::catalog::run(&args, &runtime_paths)
        }
        Command::Schema(args) => commands::schema::run(&args),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<QueryEnvelopeCommandFailure>() {
        Some(failure) if failure.error_code() == Some(commands::NO_MATCH_ERROR_CODE) => {
            EXIT_NOT_UNDERSTOOD
        }
        _ => EXIT_RUNTIME_FAILURE,
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_USAGE_ERROR,
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Translate(_) => "translate",
        Command::Query(_) => "query",
        Command::Init(_) => "init",
        Command::Suggest(_) => "suggest",
        Command::Catalog(_) => "catalog",
        Command::Schema(_) => "schema",
    }
}

fn resolve_runtime_paths(args: &RuntimeArgs) -> Result<RuntimePaths> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    nlq::config::resolve_runtime_paths(&home_dir, &cwd, args.db.as_deref(), args.config.as_deref())
}
