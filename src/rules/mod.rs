//! Token rules and the table they are registered in.
//!
//! The registry is built once at startup and only read afterwards, so the
//! same [`RuleRegistry`] can be shared by every formatting worker.

pub mod redundant_parens;
pub mod type_colon_spacing;
pub mod type_sugar;

pub use redundant_parens::RedundantParens;
pub use type_colon_spacing::TypeColonSpacing;
pub use type_sugar::TypeSugar;

use crate::config::FormatOptions;
use crate::engine::Change;
use crate::stream::{StreamError, TokenStream};
use std::path::Path;

/// A formatting rule that edits a token stream in place.
pub trait Rule: Send + Sync {
    /// Name used in configuration and reports, e.g. `redundantParens`.
    fn name(&self) -> &'static str;

    /// One-line description shown by `livespan rules` and in reports.
    fn help(&self) -> &'static str;

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Result<(), StreamError>;
}

/// Everything a rule sees while it runs over one file.
pub struct RuleContext<'a> {
    pub stream: &'a TokenStream,
    pub options: &'a FormatOptions,
    file_path: &'a Path,
    rule_name: &'static str,
    help_text: &'static str,
    changes: Vec<Change>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        stream: &'a TokenStream,
        options: &'a FormatOptions,
        file_path: &'a Path,
        rule: &dyn Rule,
    ) -> Self {
        Self {
            stream,
            options,
            file_path,
            rule_name: rule.name(),
            help_text: rule.help(),
            changes: Vec::new(),
        }
    }

    /// Record a change at the token currently at `at`.
    ///
    /// Call before the edit, while `at` still points at the original token.
    pub fn record(&mut self, at: usize) {
        let (line, column) = self.stream.line_column(at);
        self.changes.push(Change {
            file_path: self.file_path.to_path_buf(),
            line,
            column,
            rule_name: self.rule_name.to_string(),
            help_text: self.help_text.to_string(),
        });
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

/// Ordered, read-only table of rules.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// The built-in rules in the order they run.
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(TypeSugar),
            Box::new(RedundantParens),
            Box::new(TypeColonSpacing),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.iter().find(|rule| rule.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter().map(|rule| rule.name())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules to run, in registry order.
    ///
    /// `None` enables every rule; otherwise only the named ones. Names that
    /// are not registered are ignored here and rejected by config validation.
    pub fn select(&self, enabled: Option<&[String]>) -> Vec<&dyn Rule> {
        match enabled {
            None => self.iter().collect(),
            Some(names) => self
                .iter()
                .filter(|rule| names.iter().any(|name| name == rule.name()))
                .collect(),
        }
    }

    /// Closest registered name to a misspelled one.
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        self.names()
            .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
