use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{LanguageLexicon, SchemaCatalog};

pub const DEFAULT_FALLBACK_ROW_LIMIT: u32 = 100;
pub const DEFAULT_DATABASE_FILE: &str = "analytics.sqlite";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog must declare at least one table")]
    EmptyCatalog,

    #[error("catalog declares table `{0}` more than once")]
    DuplicateTable(String),

    #[error("table name `{0}` is not a lowercase SQL identifier")]
    InvalidTableName(String),

    #[error("table name `{0}` is a reserved SQL keyword")]
    ReservedTableName(String),

    #[error("rule `{rule}` references table `{table}` which is missing from the catalog")]
    MissingTable { rule: &'static str, table: &'static str },

    #[error("language `{language}` has code `{code}`; codes must be exactly two lowercase letters")]
    InvalidLanguageCode { language: String, code: String },

    #[error("fallback_row_limit must be greater than zero")]
    ZeroRowLimit,

    #[error("failed to read translator config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse translator config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
    #[default]
    Sqlite,
    Postgres,
}

impl SqlDialect {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

/// Immutable configuration a [`crate::translate::Translator`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    pub catalog: SchemaCatalog,
    pub lexicon: LanguageLexicon,
    pub dialect: SqlDialect,
    pub fallback_row_limit: u32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            catalog: SchemaCatalog::analytics(),
            lexicon: LanguageLexicon::analytics(),
            dialect: SqlDialect::Sqlite,
            fallback_row_limit: DEFAULT_FALLBACK_ROW_LIMIT,
        }
    }
}

impl TranslatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.fallback_row_limit == 0 {
            return Err(ConfigError::ZeroRowLimit);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
    pub database: PathBuf,
    pub config: Option<PathBuf>,
}

pub fn resolve_runtime_paths(
    home_dir: &Path,
    cwd: &Path,
    database_override: Option<&Path>,
    config_override: Option<&Path>,
) -> Result<RuntimePaths> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    let home_dir = normalize_lexical(home_dir);
    let cwd = normalize_lexical(cwd);
    let database = match database_override {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => home_dir.join(".nlq").join(DEFAULT_DATABASE_FILE),
    };
    let config = config_override
        .map(|path| resolve_user_path(path, &home_dir, &cwd))
        .transpose()?;

    Ok(RuntimePaths {
        home_dir,
        cwd,
        database: normalize_lexical(&database),
        config,
    })
}

impl RuntimePaths {
    /// Default translator config, or the JSON file passed with `--config`.
    pub fn load_translator_config(&self) -> Result<TranslatorConfig> {
        match &self.config {
            Some(path) => Ok(TranslatorConfig::load(path)?),
            None => Ok(TranslatorConfig::default()),
        }
    }
}

fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            expanded.extend(components.map(|component| component.as_os_str()));
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ConfigError, SqlDialect, TranslatorConfig, resolve_runtime_paths};

    fn temp_config_path(label: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("nlq-{label}-{nanos}.json"))
    }

    #[test]
    fn defaults_database_under_nlq_home() {
        let paths = resolve_runtime_paths(
            Path::new("/home/tester"),
            Path::new("/work/repo"),
            None,
            None,
        )
        .expect("paths should resolve");

        assert_eq!(paths.home_dir, Path::new("/home/tester"));
        assert_eq!(paths.cwd, Path::new("/work/repo"));
        assert_eq!(
            paths.database,
            Path::new("/home/tester/.nlq/analytics.sqlite")
        );
        assert_eq!(paths.config, None);
    }

    #[test]
    fn expands_tilde_and_relative_overrides() {
        let paths = resolve_runtime_paths(
            Path::new("/home/tester"),
            Path::new("/work/repo"),
            Some(Path::new("~/data/demo.sqlite")),
            Some(Path::new("./tenants/../tenants/acme.json")),
        )
        .expect("overrides should resolve");

        assert_eq!(paths.database, Path::new("/home/tester/data/demo.sqlite"));
        assert_eq!(
            paths.config.as_deref(),
            Some(Path::new("/work/repo/tenants/acme.json"))
        );
    }

    #[test]
    fn rejects_relative_home_and_tilde_username_syntax() {
        let err = resolve_runtime_paths(Path::new("home/tester"), Path::new("/work"), None, None)
            .expect_err("relative home dir must fail");
        assert!(err.to_string().contains("home_dir must be absolute"));

        let err = resolve_runtime_paths(
            Path::new("/home/tester"),
            Path::new("/work"),
            Some(Path::new("~someone/db.sqlite")),
            None,
        )
        .expect_err("~username syntax must fail");
        assert!(err.to_string().contains("unsupported home expansion syntax"));
    }

    #[test]
    fn partial_config_file_overrides_only_named_fields() {
        let path = temp_config_path("partial-config");
        std::fs::write(&path, r#"{"dialect":"postgres","fallback_row_limit":25}"#)
            .expect("config should be writable");

        let config = TranslatorConfig::load(&path).expect("config should load");

        assert_eq!(config.dialect, SqlDialect::Postgres);
        assert_eq!(config.fallback_row_limit, 25);
        assert_eq!(config.catalog, TranslatorConfig::default().catalog);
    }

    #[test]
    fn config_file_errors_are_typed() {
        let missing = TranslatorConfig::load(Path::new("/nonexistent/nlq/config.json"))
            .expect_err("missing file must fail");
        assert!(matches!(missing, ConfigError::Read { .. }));

        let path = temp_config_path("bad-lexicon");
        std::fs::write(&path, r#"{"lexicon":[{"name":"english","code":"ENG"}]}"#)
            .expect("config should be writable");
        let invalid = TranslatorConfig::load(&path).expect_err("bad code must fail");
        assert!(matches!(invalid, ConfigError::Parse { .. }));

        let path = temp_config_path("zero-limit");
        std::fs::write(&path, r#"{"fallback_row_limit":0}"#).expect("config should be writable");
        let zero = TranslatorConfig::load(&path).expect_err("zero limit must fail");
        assert!(matches!(zero, ConfigError::ZeroRowLimit));
    }
}
