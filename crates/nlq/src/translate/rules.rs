//! Ordered (recognizer, generator) table. Position in [`RULES`] is priority: more
//! specific phrasings sit above the general ones that would also match them.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::window::{TimeUnit, TimeWindow};
use crate::catalog::{LanguageLexicon, SchemaCatalog};
use crate::config::{ConfigError, SqlDialect};

pub struct RuleContext<'a> {
    pub catalog: &'a SchemaCatalog,
    pub lexicon: &'a LanguageLexicon,
    pub dialect: SqlDialect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub sql: String,
    pub explanation: String,
}

impl GeneratedSql {
    fn new(sql: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            explanation: explanation.into(),
        }
    }
}

pub struct Rule {
    pub id: &'static str,
    /// Tables the generator may emit; each must exist in the catalog.
    pub tables: &'static [&'static str],
    pub pattern: &'static str,
    generate: fn(&Captures<'_>, &RuleContext<'_>) -> Option<GeneratedSql>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

pub static RULES: [Rule; 15] = [
    Rule {
        id: "top_errors_in_window",
        tables: &["errors"],
        pattern: concat!(
            r"top\s+([0-9]+)\s+errors?",
            r"\s+(?:for|in|from)?\s*(?:the)?\s*last\s+([0-9]+)\s+(hour|day|week|month)s?"
        ),
        generate: top_errors_in_window,
    },
    Rule {
        id: "errors_in_window",
        tables: &["errors"],
        pattern: concat!(
            r"(?:show|list|get|find)\s+(?:all\s+)?errors?",
            r"\s+(?:for|in|from)?\s*(?:the)?\s*last\s+([0-9]+)\s+(hour|day|week|month)s?"
        ),
        generate: errors_in_window,
    },
    Rule {
        id: "failed_test_runs_in_window",
        tables: &["test_runs", "agents"],
        pattern: concat!(
            r"(?:show|list|get|find)\s+(?:all\s+)?failed\s+test\s*runs?",
            r"\s+(?:for|in|from)?\s*(?:the)?\s*last\s+([0-9]+)\s+(hour|day|week|month)s?"
        ),
        generate: failed_test_runs_in_window,
    },
    Rule {
        id: "successful_test_runs",
        tables: &["test_runs", "agents"],
        pattern: r"(?:show|list|get|find)\s+(?:all\s+)?(?:successful|passed)\s+test\s*runs?",
        generate: successful_test_runs,
    },
    Rule {
        id: "inactive_integrations",
        tables: &["integrations", "workspaces"],
        pattern: r"(?:which|what|show|list)\s+integrations?\s+(?:are\s+)?inactive",
        generate: inactive_integrations,
    },
    Rule {
        id: "integrations_by_status",
        tables: &["integrations"],
        pattern: r"(?:show|list|get)\s+(?:all\s+)?integrations?\s+(?:by\s+)?status",
        generate: integrations_by_status,
    },
    Rule {
        id: "agents_by_language",
        tables: &["agents", "workspaces"],
        pattern: r"(?:show|list|get|find)\s+(?:all\s+)?agents?\s+(?:using|with|in)\s+(\w+)\s+language",
        generate: agents_by_language,
    },
    Rule {
        id: "all_agents",
        tables: &["agents", "workspaces"],
        pattern: r"(?:show|list|get)\s+(?:all\s+)?agents?",
        generate: all_agents,
    },
    Rule {
        id: "all_workspaces",
        tables: &["workspaces"],
        pattern: r"(?:show|list|get)\s+(?:all\s+)?workspaces?",
        generate: all_workspaces,
    },
    Rule {
        id: "workspaces_by_plan",
        tables: &["workspaces"],
        pattern: r"workspaces?\s+(?:by\s+)?plan",
        generate: workspaces_by_plan,
    },
    Rule {
        id: "count_entity",
        tables: &[],
        pattern: r"(?:how many|count)\s+(\w+)",
        generate: count_entity,
    },
    Rule {
        id: "errors_by_source",
        tables: &["errors"],
        pattern: r"errors?\s+(?:by\s+)?source",
        generate: errors_by_source,
    },
    Rule {
        id: "agent_runs_by_status",
        tables: &["agent_runs", "agents"],
        pattern: r"agent\s+runs?\s+(?:by\s+)?status",
        generate: agent_runs_by_status,
    },
    Rule {
        id: "billing_by_workspace",
        tables: &["billing_usage", "workspaces"],
        pattern: r"(?:billing|usage|cost)\s+(?:by\s+)?workspace",
        generate: billing_by_workspace,
    },
    Rule {
        id: "top_token_usage",
        tables: &["billing_usage", "agents"],
        pattern: r"(?:top|highest)\s+([0-9]+)\s+(?:token|cost|usage)",
        generate: top_token_usage,
    },
];

fn compiled_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RULES
            .iter()
            .map(|rule| Regex::new(rule.pattern).expect("rule pattern should compile"))
            .collect()
    })
}

impl Rule {
    /// Recognizer and generator as one fallible step.
    #[must_use]
    pub fn apply(&self, regex: &Regex, question: &str, context: &RuleContext<'_>) -> RuleOutcome {
        let Some(captures) = regex.captures(question) else {
            return RuleOutcome::NotRecognized;
        };
        match (self.generate)(&captures, context) {
            Some(generated) => RuleOutcome::Generated(generated),
            None => RuleOutcome::Declined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    NotRecognized,
    Declined,
    Generated(GeneratedSql),
}

pub fn rules_with_patterns() -> impl Iterator<Item = (&'static Rule, &'static Regex)> {
    RULES.iter().zip(compiled_patterns())
}

#[must_use]
pub fn rule_by_id(id: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.id == id)
}

pub fn ensure_rule_tables(catalog: &SchemaCatalog) -> Result<(), ConfigError> {
    for rule in &RULES {
        if let Some(table) = rule.tables.iter().copied().find(|table| !catalog.contains(table)) {
            return Err(ConfigError::MissingTable {
                rule: rule.id,
                table,
            });
        }
    }
    Ok(())
}

fn capture_number(captures: &Captures<'_>, index: usize) -> Option<u32> {
    captures.get(index)?.as_str().parse().ok()
}

struct CapturedWindow {
    value: u32,
    unit: TimeUnit,
    window: TimeWindow,
}

impl CapturedWindow {
    fn describe(&self) -> String {
        format!("{} {}(s)", self.value, self.unit.as_str())
    }
}

fn capture_window(
    captures: &Captures<'_>,
    value_index: usize,
    unit_index: usize,
) -> Option<CapturedWindow> {
    let value = capture_number(captures, value_index)?;
    let unit = TimeUnit::parse(captures.get(unit_index)?.as_str())?;
    let window = TimeWindow::normalize(value, unit)?;
    Some(CapturedWindow {
        value,
        unit,
        window,
    })
}

fn sql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn top_errors_in_window(captures: &Captures<'_>, context: &RuleContext<'_>) -> Option<GeneratedSql> {
    let limit = capture_number(captures, 1)?;
    let window = capture_window(captures, 2, 3)?;
    let since = window.window.lower_bound_sql(context.dialect);
    Some(GeneratedSql::new(
        format!(
            "SELECT code, message, source, COUNT(*) AS error_count FROM errors \
             WHERE created_at >= {since} GROUP BY code, message, source \
             ORDER BY error_count DESC LIMIT {limit}"
        ),
        format!(
            "Finding top {limit} errors from the last {}",
            window.describe()
        ),
    ))
}

fn errors_in_window(captures: &Captures<'_>, context: &RuleContext<'_>) -> Option<GeneratedSql> {
    let window = capture_window(captures, 1, 2)?;
    let since = window.window.lower_bound_sql(context.dialect);
    Some(GeneratedSql::new(
        format!("SELECT * FROM errors WHERE created_at >= {since} ORDER BY created_at DESC"),
        format!("Showing all errors from the last {}", window.describe()),
    ))
}

fn failed_test_runs_in_window(
    captures: &Captures<'_>,
    context: &RuleContext<'_>,
) -> Option<GeneratedSql> {
    let window = capture_window(captures, 1, 2)?;
    let since = window.window.lower_bound_sql(context.dialect);
    Some(GeneratedSql::new(
        format!(
            "SELECT tr.*, a.name AS agent_name FROM test_runs tr \
             JOIN agents a ON tr.agent_id = a.id \
             WHERE tr.result = 'fail' AND tr.created_at >= {since} \
             ORDER BY tr.created_at DESC"
        ),
        format!("Finding failed test runs from the last {}", window.describe()),
    ))
}

fn successful_test_runs(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT tr.*, a.name AS agent_name FROM test_runs tr \
         JOIN agents a ON tr.agent_id = a.id \
         WHERE tr.result = 'pass' ORDER BY tr.created_at DESC",
        "Finding all successful test runs",
    ))
}

fn inactive_integrations(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT i.*, w.name AS workspace_name FROM integrations i \
         JOIN workspaces w ON i.workspace_id = w.id \
         WHERE i.status = 'inactive' ORDER BY i.created_at DESC",
        "Finding all inactive integrations",
    ))
}

fn integrations_by_status(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT type, status, COUNT(*) AS count FROM integrations \
         GROUP BY type, status ORDER BY type, status",
        "Grouping integrations by type and status",
    ))
}

fn agents_by_language(captures: &Captures<'_>, context: &RuleContext<'_>) -> Option<GeneratedSql> {
    let language = captures.get(1)?.as_str();
    let code = context.lexicon.resolve(language);
    if code.is_empty() {
        return None;
    }
    let code = sql_string_literal(&code);
    Some(GeneratedSql::new(
        format!(
            "SELECT a.*, w.name AS workspace_name FROM agents a \
             JOIN workspaces w ON a.workspace_id = w.id \
             WHERE a.language = {code} ORDER BY a.created_at DESC"
        ),
        format!("Finding all agents using {language} language"),
    ))
}

fn all_agents(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT a.*, w.name AS workspace_name FROM agents a \
         JOIN workspaces w ON a.workspace_id = w.id ORDER BY a.created_at DESC",
        "Listing all agents",
    ))
}

fn all_workspaces(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT * FROM workspaces ORDER BY created_at DESC",
        "Listing all workspaces",
    ))
}

fn workspaces_by_plan(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT plan, COUNT(*) AS count FROM workspaces GROUP BY plan ORDER BY count DESC",
        "Grouping workspaces by plan type",
    ))
}

fn count_entity(captures: &Captures<'_>, context: &RuleContext<'_>) -> Option<GeneratedSql> {
    let entity = captures.get(1)?.as_str();
    let table = context.catalog.resolve_entity(entity)?;
    Some(GeneratedSql::new(
        format!("SELECT COUNT(*) AS count FROM {table}"),
        format!("Counting total {entity}"),
    ))
}

fn errors_by_source(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT source, COUNT(*) AS count FROM errors GROUP BY source ORDER BY count DESC",
        "Grouping errors by source",
    ))
}

fn agent_runs_by_status(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT a.name AS agent_name, ar.status, COUNT(*) AS count FROM agent_runs ar \
         JOIN agents a ON ar.agent_id = a.id \
         GROUP BY a.name, ar.status ORDER BY a.name, ar.status",
        "Grouping agent runs by status",
    ))
}

fn billing_by_workspace(_: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    Some(GeneratedSql::new(
        "SELECT w.name AS workspace_name, SUM(b.total_cost_usd) AS total_cost, \
         SUM(b.tokens_used) AS total_tokens, SUM(b.calls_made) AS total_calls \
         FROM billing_usage b JOIN workspaces w ON b.workspace_id = w.id \
         GROUP BY w.id, w.name ORDER BY total_cost DESC",
        "Showing billing usage by workspace",
    ))
}

fn top_token_usage(captures: &Captures<'_>, _: &RuleContext<'_>) -> Option<GeneratedSql> {
    let limit = capture_number(captures, 1)?;
    Some(GeneratedSql::new(
        format!(
            "SELECT a.name AS agent_name, SUM(b.tokens_used) AS total_tokens, \
             SUM(b.total_cost_usd) AS total_cost FROM billing_usage b \
             JOIN agents a ON b.agent_id = a.id \
             GROUP BY a.name ORDER BY total_tokens DESC LIMIT {limit}"
        ),
        format!("Finding top {limit} agents by token usage"),
    ))
}
