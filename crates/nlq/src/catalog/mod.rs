//! Static metadata the translator may reference: tables with their columns, and the
//! language-name lexicon used by the language filter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::guardrail::is_reserved_keyword;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<String>,
}

/// Ordered table catalog. Declaration order is the tie-break for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TableSpec>", into = "Vec<TableSpec>")]
pub struct SchemaCatalog {
    tables: Vec<TableSpec>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<TableSpec>) -> Result<Self, ConfigError> {
        if tables.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = BTreeSet::new();
        for table in &tables {
            if !is_identifier(&table.name) {
                return Err(ConfigError::InvalidTableName(table.name.clone()));
            }
            if is_reserved_keyword(&table.name) {
                return Err(ConfigError::ReservedTableName(table.name.clone()));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(ConfigError::DuplicateTable(table.name.clone()));
            }
        }

        Ok(Self { tables })
    }

    #[must_use]
    pub fn analytics() -> Self {
        let tables = ANALYTICS_TABLES
            .iter()
            .map(|(name, columns)| TableSpec {
                name: (*name).to_string(),
                columns: columns.iter().map(|column| (*column).to_string()).collect(),
            })
            .collect();
        Self { tables }
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.iter()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name.as_str())
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|table| table.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// First table (catalog order) that contains `entity` or starts with it.
    #[must_use]
    pub fn resolve_entity(&self, entity: &str) -> Option<&str> {
        if entity.is_empty() {
            return None;
        }
        self.table_names()
            .find(|name| name.contains(entity) || name.starts_with(entity))
    }

    /// First table (catalog order) whose name, or its spaced variant, occurs in `text`.
    #[must_use]
    pub fn first_mentioned_table(&self, text: &str) -> Option<&str> {
        self.table_names()
            .find(|name| text.contains(*name) || text.contains(&name.replace('_', " ")))
    }
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        Self::analytics()
    }
}

impl TryFrom<Vec<TableSpec>> for SchemaCatalog {
    type Error = ConfigError;

    fn try_from(tables: Vec<TableSpec>) -> Result<Self, Self::Error> {
        Self::new(tables)
    }
}

impl From<SchemaCatalog> for Vec<TableSpec> {
    fn from(catalog: SchemaCatalog) -> Self {
        catalog.tables
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LanguageEntry>", into = "Vec<LanguageEntry>")]
pub struct LanguageLexicon {
    entries: Vec<LanguageEntry>,
}

impl LanguageLexicon {
    pub fn new(entries: Vec<LanguageEntry>) -> Result<Self, ConfigError> {
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            if !is_language_code(&entry.code) {
                return Err(ConfigError::InvalidLanguageCode {
                    language: entry.name,
                    code: entry.code,
                });
            }
            normalized.push(LanguageEntry {
                name: entry.name.trim().to_lowercase(),
                code: entry.code,
            });
        }
        Ok(Self {
            entries: normalized,
        })
    }

    #[must_use]
    pub fn analytics() -> Self {
        let entries = ANALYTICS_LANGUAGES
            .iter()
            .map(|(name, code)| LanguageEntry {
                name: (*name).to_string(),
                code: (*code).to_string(),
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn code_for(&self, language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == language)
            .map(|entry| entry.code.as_str())
    }

    /// Lexicon code, or the first two characters of the name when it is unknown.
    #[must_use]
    pub fn resolve(&self, language: &str) -> String {
        match self.code_for(language) {
            Some(code) => code.to_string(),
            None => language.chars().take(2).collect(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LanguageLexicon {
    fn default() -> Self {
        Self::analytics()
    }
}

impl TryFrom<Vec<LanguageEntry>> for LanguageLexicon {
    type Error = ConfigError;

    fn try_from(entries: Vec<LanguageEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<LanguageLexicon> for Vec<LanguageEntry> {
    fn from(lexicon: LanguageLexicon) -> Self {
        lexicon.entries
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|byte| byte.is_ascii_lowercase())
}

const ANALYTICS_TABLES: &[(&str, &[&str])] = &[
    (
        "workspaces",
        &["id", "name", "owner_id", "created_at", "plan", "status"],
    ),
    (
        "users",
        &["id", "email", "name", "workspace_id", "role", "created_at"],
    ),
    (
        "agents",
        &[
            "id",
            "workspace_id",
            "name",
            "language",
            "llm_model",
            "status",
            "created_at",
        ],
    ),
    (
        "integrations",
        &[
            "id",
            "workspace_id",
            "type",
            "config",
            "status",
            "last_sync_at",
            "created_at",
        ],
    ),
    (
        "agent_tools",
        &["id", "agent_id", "tool_name", "tool_config", "created_at"],
    ),
    (
        "agent_runs",
        &[
            "id",
            "agent_id",
            "workspace_id",
            "run_type",
            "status",
            "duration_ms",
            "started_at",
            "completed_at",
        ],
    ),
    (
        "test_runs",
        &[
            "id",
            "agent_id",
            "workspace_id",
            "test_input",
            "expected_output",
            "actual_output",
            "result",
            "error_message",
            "created_at",
        ],
    ),
    (
        "run_logs",
        &[
            "id",
            "run_id",
            "step",
            "event_type",
            "message",
            "payload",
            "timestamp",
        ],
    ),
    (
        "errors",
        &[
            "id",
            "run_id",
            "workspace_id",
            "source",
            "code",
            "message",
            "metadata",
            "created_at",
        ],
    ),
    (
        "integration_sync_logs",
        &[
            "id",
            "integration_id",
            "workspace_id",
            "sync_type",
            "status",
            "items_synced",
            "error_message",
            "created_at",
        ],
    ),
    (
        "billing_usage",
        &[
            "id",
            "workspace_id",
            "agent_id",
            "characters_generated",
            "calls_made",
            "tokens_used",
            "total_cost_usd",
            "created_at",
        ],
    ),
    (
        "audit_events",
        &[
            "id",
            "workspace_id",
            "user_id",
            "action",
            "entity",
            "before",
            "after",
            "created_at",
        ],
    ),
];

const ANALYTICS_LANGUAGES: &[(&str, &str)] = &[
    ("english", "en"),
    ("hindi", "hi"),
    ("gujarati", "gu"),
    ("tamil", "ta"),
    ("telugu", "te"),
    ("marathi", "mr"),
    ("bengali", "bn"),
    ("kannada", "kn"),
    ("malayalam", "ml"),
    ("punjabi", "pa"),
];
