use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::utils::time::{format_unix_ms, unix_timestamp_millis};

pub const QUERY_ENVELOPE_SCHEMA_VERSION: &str = "nlq.query-envelope.v1";

pub type QueryEnvelopeMeta = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelopeNotice {
    pub code: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// JSON document every `nlq` command prints on stdout (or carries in its failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub ok: bool,
    pub command: String,
    pub generated_at_utc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    pub meta: QueryEnvelopeMeta,
    pub warnings: Vec<QueryEnvelopeNotice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryEnvelopeNotice>,
}

#[derive(Debug, Clone)]
pub struct QueryEnvelopeCommandFailure {
    envelope: QueryEnvelope,
}

impl QueryEnvelopeCommandFailure {
    #[must_use]
    pub fn new(envelope: QueryEnvelope) -> Self {
        Self { envelope }
    }

    #[must_use]
    pub fn envelope(&self) -> &QueryEnvelope {
        &self.envelope
    }

    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.envelope.error.as_ref().map(|error| error.code.as_str())
    }
}

impl Display for QueryEnvelopeCommandFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.envelope) {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => f.write_str("query envelope serialization failure"),
        }
    }
}

impl std::error::Error for QueryEnvelopeCommandFailure {}

impl QueryEnvelope {
    #[must_use]
    pub fn ok(command: impl Into<String>, data: Value) -> Self {
        Self::base(command, true).with_data(data)
    }

    #[must_use]
    pub fn error(
        command: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut envelope = Self::base(command, false);
        envelope.error = Some(QueryEnvelopeNotice {
            code: code.into(),
            message: message.into(),
            details: None,
        });
        envelope
    }

    fn base(command: impl Into<String>, ok: bool) -> Self {
        let mut meta = QueryEnvelopeMeta::new();
        meta.insert(
            "schema_version".to_string(),
            json!(QUERY_ENVELOPE_SCHEMA_VERSION),
        );

        Self {
            ok,
            command: command.into(),
            generated_at_utc: format_unix_ms(unix_timestamp_millis()),
            data: None,
            meta,
            warnings: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_warning(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.warnings.push(QueryEnvelopeNotice {
            code: code.into(),
            message: message.into(),
            details: None,
        });
        self
    }

    #[must_use]
    pub fn with_error_details(mut self, details: Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.details = Some(details);
        }
        self
    }

    /// Wraps the envelope in an error so `main` can print it and pick an exit code.
    #[must_use]
    pub fn into_failure(self) -> anyhow::Error {
        anyhow::Error::new(QueryEnvelopeCommandFailure::new(self))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope, QueryEnvelopeCommandFailure};

    #[test]
    fn ok_envelope_carries_schema_version_and_data() {
        let envelope = QueryEnvelope::ok("translate", json!({ "sql": "SELECT 1" }))
            .with_meta("dialect", json!("sqlite"));

        assert!(envelope.ok);
        assert_eq!(
            envelope.meta.get("schema_version"),
            Some(&json!(QUERY_ENVELOPE_SCHEMA_VERSION))
        );
        assert_eq!(envelope.meta.get("dialect"), Some(&json!("sqlite")));
        assert!(envelope.generated_at_utc.ends_with('Z'));
    }

    #[test]
    fn failure_exposes_error_code_and_renders_json() {
        let failure = QueryEnvelopeCommandFailure::new(
            QueryEnvelope::error("translate", "question_not_understood", "no rule matched")
                .with_error_details(json!({ "question": "asdf" })),
        );

        assert_eq!(failure.error_code(), Some("question_not_understood"));
        let rendered = failure.to_string();
        let decoded: serde_json::Value =
            serde_json::from_str(&rendered).expect("failure should render as json");
        assert_eq!(decoded["error"]["details"]["question"], "asdf");
        assert_eq!(decoded["ok"], false);
    }
}
