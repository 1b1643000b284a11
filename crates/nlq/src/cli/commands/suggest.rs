use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{build_translator, print_envelope};
use crate::config::RuntimePaths;
use crate::models::{QueryEnvelope, Translation};
use crate::translate::{rule_by_id, suggestions};

#[derive(Debug, Clone, Args)]
pub struct SuggestArgs {
    /// Also report which rule each suggestion resolves to.
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

pub fn run(args: &SuggestArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    if !args.check {
        let envelope = QueryEnvelope::ok("suggest", json!({ "suggestions": suggestions() }));
        return print_envelope(&envelope);
    }

    let translator = build_translator(runtime_paths, None)?;
    let checked = suggestions()
        .iter()
        .map(|question| {
            let translation = translator.translate(question);
            json!({
                "question": question,
                "rule": translation.rule(),
                "tables": referenced_tables(&translation),
            })
        })
        .collect::<Vec<_>>();
    let unmatched = checked
        .iter()
        .filter(|entry| entry["rule"].is_null())
        .count();

    let envelope = QueryEnvelope::ok("suggest", json!({ "suggestions": checked }))
        .with_meta("checked", json!(true))
        .with_meta("unmatched", json!(unmatched));
    print_envelope(&envelope)
}

/// Tables the resolving rule is declared to read. Rules that pick their table from the
/// catalog at translation time (and the keyword fallback) report the table they chose.
fn referenced_tables(translation: &Translation) -> Vec<String> {
    let Translation::Translated(query) = translation else {
        return Vec::new();
    };
    match rule_by_id(&query.rule) {
        Some(rule) if !rule.tables.is_empty() => rule.tables.iter().map(ToString::to_string).collect(),
        _ => query
            .sql
            .split_whitespace()
            .skip_while(|token| *token != "FROM")
            .nth(1)
            .map(ToString::to_string)
            .into_iter()
            .collect(),
    }
}
