pub mod query_envelope;
pub mod translation;

pub use query_envelope::{
    QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope, QueryEnvelopeCommandFailure, QueryEnvelopeMeta,
    QueryEnvelopeNotice,
};
pub use translation::{
    KEYWORD_FALLBACK_RULE, NO_MATCH_REASON, TRANSLATION_SCHEMA_VERSION, TranslatedQuery,
    Translation, json_schema,
};
