//! Machine-readable change reports.

mod checkstyle;
mod github;
mod json;

pub use checkstyle::CheckstyleReporter;
pub use github::GithubReporter;
pub use json::JsonReporter;

use crate::engine::Change;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders a list of changes into one report document.
pub trait Reporter: Send + Sync {
    fn render(&self, changes: &[Change]) -> Result<String, ReportError>;
}

/// Reporter names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReporterKind {
    Json,
    Checkstyle,
    Github,
}

impl ReporterKind {
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            ReporterKind::Json => Box::new(JsonReporter),
            ReporterKind::Checkstyle => Box::new(CheckstyleReporter),
            ReporterKind::Github => Box::new(GithubReporter),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_changes() -> Vec<Change> {
    use std::path::PathBuf;
    vec![
        Change {
            file_path: PathBuf::from("Sources/A.swift"),
            line: 3,
            column: 8,
            rule_name: "typeSugar".to_string(),
            help_text: "Prefer shorthand syntax for Arrays, Dictionaries and Optionals.".to_string(),
        },
        Change {
            file_path: PathBuf::from("Sources/A.swift"),
            line: 5,
            column: 6,
            rule_name: "typeColonSpacing".to_string(),
            help_text: "Remove space before and add a single space after type colons.".to_string(),
        },
        Change {
            file_path: PathBuf::from("Sources/B & C.swift"),
            line: 1,
            column: 1,
            rule_name: "custom".to_string(),
            help_text: "100% <wrong>\nsecond line".to_string(),
        },
    ]
}
