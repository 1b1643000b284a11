use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRANSLATION_SCHEMA_VERSION: &str = "nlq.translation.v1";
pub const KEYWORD_FALLBACK_RULE: &str = "keyword_fallback";
pub const NO_MATCH_REASON: &str =
    "Could not understand the question. Try one of the suggested questions or be more specific.";

/// A single read-only statement produced for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TranslatedQuery {
    pub sql: String,
    pub explanation: String,

    /// Id of the rule that produced `sql`, or `keyword_fallback`.
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Translation {
    Translated(TranslatedQuery),
    NoMatch { reason: String },
}

impl Translation {
    #[must_use]
    pub fn translated(
        sql: impl Into<String>,
        explanation: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self::Translated(TranslatedQuery {
            sql: sql.into(),
            explanation: explanation.into(),
            rule: rule.into(),
        })
    }

    #[must_use]
    pub fn no_match(reason: impl Into<String>) -> Self {
        Self::NoMatch {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Translated(query) => Some(&query.sql),
            Self::NoMatch { .. } => None,
        }
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        match self {
            Self::Translated(query) => &query.explanation,
            Self::NoMatch { reason } => reason,
        }
    }

    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::Translated(query) => Some(&query.rule),
            Self::NoMatch { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(Translation);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated translation schema: {error}");
        }
    }
}
