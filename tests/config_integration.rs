//! Integration tests for configuration loading
//!
//! Tests the version gate, validation, and how a loaded config drives the
//! formatter.

use livespan::config::{default_document, load_from_path, load_from_str, ConfigError};
use livespan::{Formatter, RuleRegistry};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_load_from_path_attaches_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("livespan.toml");
    fs::write(&path, "version = \"3.1.0\"\n").unwrap();

    let error = load_from_path(&path).unwrap_err();
    assert!(matches!(error, ConfigError::UnsupportedVersion { .. }));
    let message = error.to_string();
    assert!(message.contains("livespan.toml"), "{message}");
    assert!(message.contains("3.1.0"), "{message}");
}

#[test]
fn test_missing_file() {
    let error = load_from_path("/nonexistent/livespan.toml").unwrap_err();
    assert!(matches!(error, ConfigError::Io { .. }));
}

#[test]
fn test_unknown_rule_is_rejected_with_suggestion() {
    let error = load_from_str("version = \"1.0.0\"\nrules = [\"typeSugars\"]").unwrap_err();
    assert!(matches!(error, ConfigError::Validation { .. }));
    assert!(error.to_string().contains("did you mean 'typeSugar'?"));
}

#[test]
fn test_malformed_custom_rule_rejected_at_load() {
    let input = r#"
version = "1.0.0"

[options]
custom_rules = ["broken/(unclosed/x/", "noTrailing/a/b"]
"#;
    let error = load_from_str(input).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("custom_rules[0]"), "{message}");
    assert!(message.contains("custom_rules[1]"), "{message}");
}

#[test]
fn test_rules_subset_controls_formatter() {
    let config = load_from_str(
        r#"
version = "1.2.0"
rules = ["typeColonSpacing"]

[options]
sugar_optionals = false
"#,
    )
    .unwrap();
    let registry = RuleRegistry::builtin();
    let formatter = Formatter::new(&registry, &config).unwrap();
    let result = formatter
        .format(Path::new("a.swift"), "let a :Array<(Int)>")
        .unwrap();
    assert_eq!(result.output, "let a: Array<(Int)>");
    assert!(!formatter.options().sugar_optionals);
}

#[test]
fn test_init_document_loads() {
    let registry = RuleRegistry::builtin();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("livespan.toml");
    fs::write(&path, default_document(&registry).to_string()).unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.version, "1.0.0");
    assert_eq!(config.rules.map(|rules| rules.len()), Some(registry.len()));
}
