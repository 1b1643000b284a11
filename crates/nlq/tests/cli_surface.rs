use std::path::Path;

use clap::Parser;
use nlq::cli::app::{Cli, Command};
use nlq::cli::commands::DialectArg;

#[test]
fn parses_global_runtime_flags_for_query() {
    let cli = Cli::parse_from([
        "nlq",
        "--home-dir",
        "/home/tester",
        "--db",
        "/tmp/analytics.sqlite",
        "query",
        "how many agents",
        "--row-cap",
        "25",
    ]);

    assert_eq!(
        cli.runtime.home_dir.as_deref(),
        Some(Path::new("/home/tester"))
    );
    assert_eq!(
        cli.runtime.db.as_deref(),
        Some(Path::new("/tmp/analytics.sqlite"))
    );
    assert!(cli.runtime.config.is_none());

    match cli.command {
        Command::Query(args) => {
            assert_eq!(args.question, "how many agents");
            assert_eq!(args.row_cap, 25);
        }
        other => panic!("expected query command, got {other:?}"),
    }
}

#[test]
fn translate_accepts_dialect_and_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "nlq",
        "translate",
        "top 5 errors for the last 24 hours",
        "--dialect",
        "postgres",
        "--config",
        "nlq.json",
    ]);

    assert_eq!(cli.runtime.config.as_deref(), Some(Path::new("nlq.json")));
    match cli.command {
        Command::Translate(args) => assert_eq!(args.dialect, Some(DialectArg::Postgres)),
        other => panic!("expected translate command, got {other:?}"),
    }
}

#[test]
fn query_row_cap_defaults_to_one_thousand() {
    let cli = Cli::parse_from(["nlq", "query", "list all agents"]);

    match cli.command {
        Command::Query(args) => assert_eq!(args.row_cap, 1_000),
        other => panic!("expected query command, got {other:?}"),
    }
}

#[test]
fn unknown_dialect_is_a_usage_error() {
    let error = Cli::try_parse_from(["nlq", "translate", "x", "--dialect", "oracle"])
        .expect_err("unknown dialect should be rejected");

    assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);
}
