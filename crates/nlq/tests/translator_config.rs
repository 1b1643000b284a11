use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use nlq::catalog::{LanguageEntry, LanguageLexicon, SchemaCatalog, TableSpec};
use nlq::config::{ConfigError, SqlDialect, TranslatorConfig};
use nlq::{Translation, Translator};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("{prefix}-{nanos}"));
    std::fs::create_dir_all(&path).expect("temp dir should be creatable");
    path
}

fn analytics_with_extra_table(name: &str) -> SchemaCatalog {
    let mut tables = SchemaCatalog::analytics().tables().cloned().collect::<Vec<_>>();
    tables.push(TableSpec {
        name: name.to_string(),
        columns: vec!["id".to_string(), "body".to_string()],
    });
    SchemaCatalog::new(tables).expect("extended catalog should be valid")
}

#[test]
fn config_file_overrides_dialect_and_row_limit() {
    let dir = unique_temp_dir("nlq-config-load");
    let path = dir.join("nlq.json");
    std::fs::write(&path, r#"{"dialect":"postgres","fallback_row_limit":25}"#)
        .expect("config should be writable");

    let config = TranslatorConfig::load(&path).expect("config should load");
    assert_eq!(config.dialect, SqlDialect::Postgres);
    assert_eq!(config.catalog, SchemaCatalog::analytics());

    let translator = Translator::new(config).expect("translator should build");
    assert_eq!(
        translator.translate("anything about run logs").sql(),
        Some("SELECT * FROM run_logs LIMIT 25")
    );
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = unique_temp_dir("nlq-config-unknown");
    let path = dir.join("nlq.json");
    std::fs::write(&path, r#"{"row_limit":25}"#).expect("config should be writable");

    assert!(matches!(
        TranslatorConfig::load(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn keyword_table_name_in_config_file_is_rejected() {
    let dir = unique_temp_dir("nlq-config-keyword-table");
    let path = dir.join("nlq.json");
    let mut tables = serde_json::to_value(SchemaCatalog::analytics()).expect("catalog should serialize");
    tables
        .as_array_mut()
        .expect("catalog should serialize as an array")
        .push(serde_json::json!({"name": "delete", "columns": ["id"]}));
    std::fs::write(&path, serde_json::json!({ "catalog": tables }).to_string())
        .expect("config should be writable");

    let err = TranslatorConfig::load(&path).expect_err("keyword table name must fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(
        std::error::Error::source(&err)
            .is_some_and(|source| source.to_string().contains("reserved SQL keyword"))
    );
}

#[test]
fn catalog_missing_rule_table_is_rejected_at_construction() {
    let catalog = SchemaCatalog::new(vec![TableSpec {
        name: "agents".to_string(),
        columns: vec!["id".to_string()],
    }])
    .expect("single-table catalog should be valid");
    let config = TranslatorConfig {
        catalog,
        ..TranslatorConfig::default()
    };

    let err = Translator::new(config).expect_err("rules referencing absent tables must fail");
    assert!(matches!(err, ConfigError::MissingTable { .. }));
}

#[test]
fn extra_catalog_tables_are_reachable_by_keyword_and_count() {
    let config = TranslatorConfig {
        catalog: analytics_with_extra_table("notes"),
        ..TranslatorConfig::default()
    };
    let translator = Translator::new(config).expect("translator should build");

    assert_eq!(
        translator.translate("how many notes").sql(),
        Some("SELECT COUNT(*) AS count FROM notes")
    );
    assert_eq!(
        translator.translate("show me the notes").sql(),
        Some("SELECT * FROM notes LIMIT 100")
    );
}

#[test]
fn custom_lexicon_changes_language_resolution() {
    let lexicon = LanguageLexicon::new(vec![LanguageEntry {
        name: "Spanish".to_string(),
        code: "es".to_string(),
    }])
    .expect("lexicon should be valid");
    let translator = Translator::new(TranslatorConfig {
        lexicon,
        ..TranslatorConfig::default()
    })
    .expect("translator should build");

    let spanish = translator.translate("show agents with spanish language");
    let gujarati = translator.translate("show agents with gujarati language");

    assert!(spanish.sql().is_some_and(|sql| sql.contains("a.language = 'es'")));
    assert!(gujarati.sql().is_some_and(|sql| sql.contains("a.language = 'gu'")));
}

#[test]
fn no_match_is_reported_for_custom_catalog_too() {
    let translator = Translator::new(TranslatorConfig {
        catalog: analytics_with_extra_table("notes"),
        ..TranslatorConfig::default()
    })
    .expect("translator should build");

    assert!(matches!(
        translator.translate("what is the weather"),
        Translation::NoMatch { .. }
    ));
}
