//! Read-only single-statement contract shared by every translator.

use serde_json::{Value, json};

const MUTATING_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "replace", "truncate", "attach",
    "detach", "pragma", "vacuum", "reindex", "analyze", "begin", "commit", "rollback",
];

/// True for words that may not appear as bare identifiers in generated SQL.
#[must_use]
pub fn is_reserved_keyword(word: &str) -> bool {
    word == "select" || MUTATING_KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlGuardrailViolation {
    pub message: String,
    pub details: Value,
}

impl SqlGuardrailViolation {
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.details
            .pointer("/violation/reason")
            .and_then(Value::as_str)
    }
}

impl std::fmt::Display for SqlGuardrailViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SqlGuardrailViolation {}

pub fn validate_read_only_sql(sql: &str) -> Result<(), SqlGuardrailViolation> {
    let candidate = sql.trim();
    if candidate.is_empty() {
        return Err(guardrail_violation(
            "SQL query is empty; expected a single SELECT statement",
            json!({"reason":"empty_statement"}),
        ));
    }

    if candidate.contains(';') {
        return Err(guardrail_violation(
            "Statement separators are not allowed; emit exactly one SELECT statement",
            json!({"reason":"multi_statement"}),
        ));
    }

    let normalized = candidate.to_ascii_lowercase();
    if let Some(keyword) = first_mutating_keyword(&normalized) {
        return Err(guardrail_violation(
            format!("Mutating SQL keyword `{keyword}` is not allowed"),
            json!({"reason":"mutating_statement","detected_keyword":keyword}),
        ));
    }

    if leading_keyword(&normalized) != "select" {
        return Err(guardrail_violation(
            "Only SELECT statements are allowed",
            json!({"reason":"unsupported_statement","leading_keyword":leading_keyword(&normalized)}),
        ));
    }

    Ok(())
}

/// Pulls the first SELECT statement out of free-form model output: drops markdown
/// fences and surrounding prose, joins the statement onto one line and strips the
/// trailing separator. Returns `None` when no line starts with SELECT.
#[must_use]
pub fn extract_statement(raw: &str) -> Option<String> {
    let unfenced = raw.replace("```sql", "").replace("```", "");
    let mut lines = Vec::new();
    let mut in_statement = false;

    for line in unfenced.lines().map(str::trim) {
        if !in_statement && line.to_ascii_uppercase().starts_with("SELECT") {
            in_statement = true;
        }
        if in_statement {
            if line.is_empty() {
                continue;
            }
            lines.push(line);
            if line.ends_with(';') {
                break;
            }
        }
    }

    let joined = lines.join(" ");
    let statement = strip_trailing_semicolons(&joined);
    (!statement.is_empty()).then(|| statement.to_string())
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

fn first_mutating_keyword(normalized_sql: &str) -> Option<String> {
    sql_tokens(normalized_sql).find_map(|token| {
        MUTATING_KEYWORDS
            .contains(&token)
            .then_some(token.to_string())
    })
}

fn leading_keyword(normalized_sql: &str) -> String {
    sql_tokens(normalized_sql)
        .next()
        .unwrap_or("unknown")
        .to_string()
}

fn sql_tokens(normalized_sql: &str) -> impl Iterator<Item = &str> {
    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .filter(|token| !token.is_empty())
}

fn guardrail_violation(message: impl Into<String>, details: Value) -> SqlGuardrailViolation {
    SqlGuardrailViolation {
        message: message.into(),
        details: json!({
            "allowed_forms": ["SELECT ..."],
            "guardrail": "read_only_sql_single_statement",
            "violation": details
        }),
    }
}
