//! Runs the configured rules over one file.

use crate::config::{ConfigError, FormatConfig, FormatOptions};
use crate::custom::CustomRule;
use crate::rules::{Rule, RuleContext, RuleRegistry};
use crate::stream::{StreamError, TokenStream};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// One place where a rule changed (or, in lint mode, would change) a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub file_path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub rule_name: String,
    pub help_text: String,
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("rule '{rule}' failed on {}: {source}", file.display())]
    Rule {
        rule: &'static str,
        file: PathBuf,
        #[source]
        source: StreamError,
    },
}

#[derive(Debug, Clone)]
pub struct FormatOutput {
    pub path: PathBuf,
    pub source: String,
    pub output: String,
    pub changes: Vec<Change>,
}

impl FormatOutput {
    pub fn is_changed(&self) -> bool {
        self.source != self.output
    }
}

/// Formats files with a fixed set of rules and options.
///
/// Holds only shared references and compiled regexes, so one formatter can
/// serve every worker thread.
pub struct Formatter<'r> {
    rules: Vec<&'r dyn Rule>,
    custom_rules: Vec<CustomRule>,
    options: FormatOptions,
}

impl<'r> Formatter<'r> {
    pub fn new(registry: &'r RuleRegistry, config: &FormatConfig) -> Result<Self, ConfigError> {
        config.validate(registry)?;
        Ok(Self {
            rules: registry.select(config.rules.as_deref()),
            custom_rules: config.compile_custom_rules()?,
            options: config.options.clone(),
        })
    }

    /// Every built-in rule, default options.
    pub fn with_defaults(registry: &'r RuleRegistry) -> Self {
        Self {
            rules: registry.select(None),
            custom_rules: Vec::new(),
            options: FormatOptions::default(),
        }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Custom textual rules run first on the raw text; the result is then
    /// lexed once and every token rule edits the same stream in order.
    pub fn format(&self, path: &Path, source: &str) -> Result<FormatOutput, FormatError> {
        let mut changes = Vec::new();
        let mut text = source.to_string();
        for rule in &self.custom_rules {
            if let Some(rewrite) = rule.apply(&text) {
                let (line, column) = line_column_at(&text, rewrite.offset);
                debug!(rule = rule.name(), file = %path.display(), "custom rule matched");
                changes.push(Change {
                    file_path: path.to_path_buf(),
                    line,
                    column,
                    rule_name: rule.name().to_string(),
                    help_text: format!("Custom rule: /{}/{}/", rule.pattern(), rule.replacement()),
                });
                text = rewrite.text;
            }
        }

        let stream = TokenStream::from_source(&text);
        for rule in &self.rules {
            let mut ctx = RuleContext::new(&stream, &self.options, path, *rule);
            rule.apply(&mut ctx).map_err(|source| FormatError::Rule {
                rule: rule.name(),
                file: path.to_path_buf(),
                source,
            })?;
            let found = ctx.into_changes();
            debug!(rule = rule.name(), changes = found.len(), file = %path.display(), "rule applied");
            changes.extend(found);
        }

        Ok(FormatOutput {
            path: path.to_path_buf(),
            source: source.to_string(),
            output: stream.source(),
            changes,
        })
    }
}

/// 1-based line and column of a byte offset.
fn line_column_at(text: &str, offset: usize) -> (usize, usize) {
    let prefix = &text[..offset.min(text.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = match prefix.rfind('\n') {
        Some(last_break) => prefix[last_break + 1..].chars().count() + 1,
        None => prefix.chars().count() + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_with_defaults() {
        let registry = RuleRegistry::builtin();
        let formatter = Formatter::with_defaults(&registry);
        let result = formatter
            .format(Path::new("a.swift"), "let a :Array<Int> = []\nlet b: (Int) = 1\n")
            .unwrap();
        assert_eq!(result.output, "let a: [Int] = []\nlet b: Int = 1\n");
        assert!(result.is_changed());
        let rules: Vec<_> = result.changes.iter().map(|c| c.rule_name.as_str()).collect();
        assert_eq!(rules, ["typeSugar", "redundantParens", "typeColonSpacing"]);
    }

    #[test]
    fn test_unchanged_file() {
        let registry = RuleRegistry::builtin();
        let formatter = Formatter::with_defaults(&registry);
        let result = formatter
            .format(Path::new("a.swift"), "let a: [Int] = []\n")
            .unwrap();
        assert!(!result.is_changed());
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_custom_rules_run_first() {
        let config = load_from_str(
            r#"
version = "1.0.0"
rules = ["typeSugar"]

[options]
custom_rules = ["arr/NSArray/Array<Any>/"]
"#,
        )
        .unwrap();
        let registry = RuleRegistry::builtin();
        let formatter = Formatter::new(&registry, &config).unwrap();
        let result = formatter
            .format(Path::new("a.swift"), "let x = 1\nlet a: NSArray")
            .unwrap();
        assert_eq!(result.output, "let x = 1\nlet a: [Any]");
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.changes[0].rule_name, "arr");
        assert_eq!((result.changes[0].line, result.changes[0].column), (2, 8));
    }

    #[test]
    fn test_line_column_at() {
        assert_eq!(line_column_at("abc", 0), (1, 1));
        assert_eq!(line_column_at("ab\ncd", 4), (2, 2));
    }
}
