//! User-defined textual rules of the form `name/pattern/replacement/`.
//!
//! Custom rules run over raw source text before lexing. Fields are separated
//! by unescaped `/`; `\/` puts a literal slash in a field and every other
//! backslash is passed through to the regex untouched.

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CustomRuleError {
    #[error("custom rule '{rule}' needs name/pattern/replacement/ (found {found} field(s))")]
    MissingFields { rule: String, found: usize },

    #[error("custom rule '{rule}' has content after the closing '/': '{trailing}'")]
    TrailingContent { rule: String, trailing: String },

    #[error("custom rule '{rule}' has an empty name")]
    EmptyName { rule: String },

    #[error("custom rule '{name}' has an empty pattern")]
    EmptyPattern { name: String },

    #[error("custom rule '{name}' has an invalid pattern")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CustomRule {
    name: String,
    pattern: Regex,
    replacement: String,
}

/// Result of a custom rule that changed the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Byte offset of the first match in the input.
    pub offset: usize,
}

impl CustomRule {
    pub fn parse(rule: &str) -> Result<Self, CustomRuleError> {
        let (fields, trailing) = split_fields(rule);
        if fields.len() < 3 {
            return Err(CustomRuleError::MissingFields {
                rule: rule.to_string(),
                found: fields.len(),
            });
        }
        if let Some(trailing) = trailing.filter(|text| !text.is_empty()) {
            return Err(CustomRuleError::TrailingContent {
                rule: rule.to_string(),
                trailing,
            });
        }
        let [name, pattern, replacement] = <[String; 3]>::try_from(fields).map_err(|fields| {
            CustomRuleError::MissingFields {
                rule: rule.to_string(),
                found: fields.len(),
            }
        })?;
        if name.is_empty() {
            return Err(CustomRuleError::EmptyName {
                rule: rule.to_string(),
            });
        }
        if pattern.is_empty() {
            return Err(CustomRuleError::EmptyPattern { name });
        }
        let pattern = Regex::new(&pattern)
            .map_err(|source| CustomRuleError::InvalidPattern {
                name: name.clone(),
                source,
            })?;
        Ok(Self {
            name,
            pattern,
            replacement,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match in `text`. `None` when nothing changes.
    pub fn apply(&self, text: &str) -> Option<Rewrite> {
        let offset = self.pattern.find(text)?.start();
        let rewritten = self.pattern.replace_all(text, self.replacement.as_str());
        if rewritten == text {
            return None;
        }
        Some(Rewrite {
            text: rewritten.into_owned(),
            offset,
        })
    }
}

/// Closed fields (each terminated by `/`, at most three) and whatever follows
/// the third separator. An unterminated field is not counted.
fn split_fields(rule: &str) -> (Vec<String>, Option<String>) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = rule.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('/') => current.push('/'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '/' => {
                fields.push(std::mem::take(&mut current));
                if fields.len() == 3 {
                    return (fields, Some(chars.collect()));
                }
            }
            _ => current.push(c),
        }
    }
    (fields, None)
}
