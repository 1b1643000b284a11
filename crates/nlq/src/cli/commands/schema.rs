use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::print_envelope;
use crate::models::{QueryEnvelope, TRANSLATION_SCHEMA_VERSION, json_schema};

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {}

pub fn run(_args: &SchemaArgs) -> Result<()> {
    let envelope = QueryEnvelope::ok("schema", json_schema())
        .with_meta("translation_schema_version", json!(TRANSLATION_SCHEMA_VERSION));
    print_envelope(&envelope)
}
