pub mod fallback;
pub mod rules;
pub mod suggestions;
pub mod window;

use tracing::{debug, warn};

use crate::config::{ConfigError, TranslatorConfig};
use crate::guardrail::{extract_statement, validate_read_only_sql};
use crate::models::Translation;

pub use rules::{RULES, Rule, RuleOutcome, rule_by_id};
pub use suggestions::{SUGGESTIONS, suggestions};
pub use window::{TimeUnit, TimeWindow, WindowUnit};

/// Anything that turns a question into a read-only statement.
pub trait SqlTranslator {
    fn translate(&self, question: &str) -> Translation;
}

/// Offline rule-table translator. Holds only immutable configuration, so one value can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Result<Self, ConfigError> {
        if config.fallback_row_limit == 0 {
            return Err(ConfigError::ZeroRowLimit);
        }
        rules::ensure_rule_tables(&config.catalog)?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    #[must_use]
    pub fn translate(&self, question: &str) -> Translation {
        let normalized = normalize_question(question);
        let context = rules::RuleContext {
            catalog: &self.config.catalog,
            lexicon: &self.config.lexicon,
            dialect: self.config.dialect,
        };

        for (rule, regex) in rules::rules_with_patterns() {
            match rule.apply(regex, &normalized, &context) {
                RuleOutcome::NotRecognized => {}
                RuleOutcome::Declined => {
                    debug!(rule = rule.id, "rule recognized the question but declined");
                }
                RuleOutcome::Generated(generated) => {
                    debug!(rule = rule.id, "rule matched");
                    return Translation::translated(generated.sql, generated.explanation, rule.id);
                }
            }
        }

        fallback::keyword_query(
            &normalized,
            &self.config.catalog,
            self.config.fallback_row_limit,
        )
    }
}

impl SqlTranslator for Translator {
    fn translate(&self, question: &str) -> Translation {
        Translator::translate(self, question)
    }
}

/// Enforces the read-only contract on another translator's output. Model-style output is
/// reduced to its first SELECT statement first; anything that still fails the guardrail
/// becomes a no-match.
#[derive(Debug, Clone)]
pub struct GuardedTranslator<T> {
    inner: T,
}

impl<T: SqlTranslator> GuardedTranslator<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: SqlTranslator> SqlTranslator for GuardedTranslator<T> {
    fn translate(&self, question: &str) -> Translation {
        let mut query = match self.inner.translate(question) {
            Translation::Translated(query) => query,
            no_match => return no_match,
        };

        let Some(statement) = extract_statement(&query.sql) else {
            warn!(rule = %query.rule, "translator output contains no SELECT statement");
            return Translation::no_match(
                "Generated SQL was rejected: no SELECT statement found in translator output",
            );
        };

        if let Err(violation) = validate_read_only_sql(&statement) {
            warn!(rule = %query.rule, reason = ?violation.reason(), "translator output failed guardrail");
            return Translation::no_match(format!("Generated SQL was rejected: {violation}"));
        }

        query.sql = statement;
        Translation::Translated(query)
    }
}

fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{GuardedTranslator, SqlTranslator, Translator, normalize_question};
    use crate::config::{ConfigError, TranslatorConfig};
    use crate::models::Translation;

    struct CannedTranslator {
        output: &'static str,
        calls: Cell<usize>,
    }

    impl CannedTranslator {
        fn new(output: &'static str) -> Self {
            Self {
                output,
                calls: Cell::new(0),
            }
        }
    }

    impl SqlTranslator for CannedTranslator {
        fn translate(&self, _question: &str) -> Translation {
            self.calls.set(self.calls.get() + 1);
            if self.output.is_empty() {
                Translation::no_match("canned no match")
            } else {
                Translation::translated(self.output, "canned", "canned")
            }
        }
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_question("  Show ALL Workspaces \n"), "show all workspaces");
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        let config = TranslatorConfig {
            fallback_row_limit: 0,
            ..TranslatorConfig::default()
        };

        assert!(matches!(
            Translator::new(config),
            Err(ConfigError::ZeroRowLimit)
        ));
    }

    #[test]
    fn guard_cleans_model_output() {
        let guarded = GuardedTranslator::new(CannedTranslator::new(
            "```sql\nSELECT * FROM agents\nLIMIT 5;\n```",
        ));

        let translation = guarded.translate("anything");

        assert_eq!(translation.sql(), Some("SELECT * FROM agents LIMIT 5"));
        assert_eq!(guarded.into_inner().calls.get(), 1);
    }

    #[test]
    fn guard_rejects_mutating_output() {
        let guarded = GuardedTranslator::new(CannedTranslator::new(
            "SELECT * FROM agents WHERE id IN (DELETE FROM agents)",
        ));

        let translation = guarded.translate("anything");

        assert!(!translation.is_match());
        assert!(translation.explanation().contains("Mutating SQL keyword `delete`"));
    }

    #[test]
    fn guard_rejects_output_without_select() {
        let guarded = GuardedTranslator::new(CannedTranslator::new("DROP TABLE agents"));

        let translation = guarded.translate("anything");

        assert!(!translation.is_match());
        assert!(translation.explanation().contains("no SELECT statement"));
    }

    #[test]
    fn guard_passes_no_match_through() {
        let guarded = GuardedTranslator::new(CannedTranslator::new(""));

        assert_eq!(
            guarded.translate("anything"),
            Translation::no_match("canned no match")
        );
        assert_eq!(guarded.into_inner().calls.get(), 1);
    }

    #[test]
    fn rule_based_translator_satisfies_guard() {
        let guarded = GuardedTranslator::new(Translator::default());

        assert_eq!(
            guarded.translate("How many agents").sql(),
            Some("SELECT COUNT(*) AS count FROM agents")
        );
    }
}
