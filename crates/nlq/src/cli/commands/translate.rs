use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{DialectArg, NO_MATCH_ERROR_CODE, build_translator, print_envelope};
use crate::config::RuntimePaths;
use crate::models::{QueryEnvelope, Translation};
use crate::translate::suggestions;

#[derive(Debug, Clone, Args)]
pub struct TranslateArgs {
    #[arg(value_name = "QUESTION")]
    pub question: String,

    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,
}

pub fn run(args: &TranslateArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let translator = build_translator(runtime_paths, args.dialect.map(Into::into))?;
    let dialect = translator.config().dialect;

    match translator.translate(&args.question) {
        Translation::Translated(query) => {
            let envelope = QueryEnvelope::ok("translate", json!(query))
                .with_meta("dialect", json!(dialect.as_str()))
                .with_meta("question", json!(args.question));
            print_envelope(&envelope)
        }
        Translation::NoMatch { reason } => Err(no_match_envelope(
            "translate",
            &args.question,
            &reason,
        )
        .into_failure()),
    }
}

pub(crate) fn no_match_envelope(command: &str, question: &str, reason: &str) -> QueryEnvelope {
    QueryEnvelope::error(command, NO_MATCH_ERROR_CODE, reason).with_error_details(json!({
        "question": question,
        "suggestions": suggestions(),
    }))
}
