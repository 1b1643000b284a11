use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{build_translator, print_envelope};
use crate::config::RuntimePaths;
use crate::models::QueryEnvelope;
use crate::translate::RULES;

#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Include each rule's recognizer pattern.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: &CatalogArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let translator = build_translator(runtime_paths, None)?;
    let config = translator.config();

    let rules = RULES
        .iter()
        .enumerate()
        .map(|(priority, rule)| {
            let mut entry = json!({
                "priority": priority,
                "id": rule.id,
                "tables": rule.tables,
            });
            if args.verbose {
                entry["pattern"] = json!(rule.pattern);
            }
            entry
        })
        .collect::<Vec<_>>();

    let envelope = QueryEnvelope::ok(
        "catalog",
        json!({
            "tables": config.catalog,
            "languages": config.lexicon,
            "dialect": config.dialect,
            "fallback_row_limit": config.fallback_row_limit,
            "rules": rules,
        }),
    )
    .with_meta(
        "config_source",
        json!(
            runtime_paths
                .config
                .as_ref()
                .map_or_else(|| "default".to_string(), |path| path.display().to_string())
        ),
    );
    print_envelope(&envelope)
}
