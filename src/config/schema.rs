use crate::custom::{CustomRule, CustomRuleError};
use crate::rules::RuleRegistry;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Version written by `livespan init`.
pub const DEFAULT_CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    pub version: String,
    /// Enabled rules; `None` enables every registered rule.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    #[serde(default)]
    pub options: FormatOptions,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct FormatOptions {
    /// Rewrite `Optional<T>` as `T?`.
    pub sugar_optionals: bool,
    /// Textual rules in `name/pattern/replacement/` form.
    pub custom_rules: Vec<String>,
    /// Path prefixes the CLI skips.
    pub exclude: Vec<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            sugar_optionals: true,
            custom_rules: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            rules: None,
            options: FormatOptions::default(),
        }
    }
}

/// Only the `version` key, decoded before the rest of the document.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionHeader {
    pub version: Option<String>,
}

impl FormatConfig {
    pub fn validate(&self, registry: &RuleRegistry) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for name in self.rules.iter().flatten() {
            if registry.get(name).is_none() {
                issues.push(ValidationIssue::UnknownRule {
                    name: name.clone(),
                    suggestion: registry.suggest(name),
                });
            }
        }

        for (index, rule) in self.options.custom_rules.iter().enumerate() {
            if let Err(source) = CustomRule::parse(rule) {
                issues.push(ValidationIssue::CustomRule { index, source });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn compile_custom_rules(&self) -> Result<Vec<CustomRule>, ValidationError> {
        self.options
            .custom_rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                CustomRule::parse(rule).map_err(|source| ValidationError {
                    issues: vec![ValidationIssue::CustomRule { index, source }],
                })
            })
            .collect()
    }

    /// Whether `path` falls under one of the `exclude` prefixes.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.options
            .exclude
            .iter()
            .any(|prefix| path.starts_with(prefix) || path.to_string_lossy().starts_with(prefix.as_str()))
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum ValidationIssue {
    UnknownRule {
        name: String,
        suggestion: Option<&'static str>,
    },
    CustomRule {
        index: usize,
        source: CustomRuleError,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UnknownRule { name, suggestion } => match suggestion {
                Some(known) => write!(f, "unknown rule '{name}' (did you mean '{known}'?)"),
                None => write!(f, "unknown rule '{name}'"),
            },
            ValidationIssue::CustomRule { index, source } => {
                write!(f, "custom_rules[{index}]: {source}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_suggests() {
        let config = FormatConfig {
            rules: Some(vec!["redundantParen".to_string(), "nope".to_string()]),
            ..FormatConfig::default()
        };
        let error = config.validate(&RuleRegistry::builtin()).unwrap_err();
        assert_eq!(error.issues.len(), 2);
        assert_eq!(
            error.to_string(),
            "unknown rule 'redundantParen' (did you mean 'redundantParens'?)\nunknown rule 'nope'"
        );
    }

    #[test]
    fn test_bad_custom_rule_reported_with_index() {
        let mut config = FormatConfig::default();
        config.options.custom_rules = vec!["ok/a/b/".to_string(), "bad/(/x/".to_string()];
        let error = config.validate(&RuleRegistry::builtin()).unwrap_err();
        assert!(matches!(
            error.issues.as_slice(),
            [ValidationIssue::CustomRule { index: 1, .. }]
        ));
        assert!(config.compile_custom_rules().is_err());
    }

    #[test]
    fn test_exclude_prefixes() {
        let mut config = FormatConfig::default();
        config.options.exclude = vec!["Generated".to_string(), "Sources/Gen".to_string()];
        assert!(config.is_excluded(Path::new("Generated/Model.swift")));
        assert!(config.is_excluded(Path::new("Sources/Generated.swift")));
        assert!(!config.is_excluded(Path::new("Sources/App.swift")));
    }
}
