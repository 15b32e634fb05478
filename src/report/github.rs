//! GitHub Actions workflow commands:
//! `::warning file={path},line={line}::{help} ({rule})`

use super::{ReportError, Reporter};
use crate::engine::Change;

pub struct GithubReporter;

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Property values additionally escape the separators `:` and `,`.
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

impl Reporter for GithubReporter {
    fn render(&self, changes: &[Change]) -> Result<String, ReportError> {
        let mut output = String::new();
        for change in changes {
            output.push_str(&format!(
                "::warning file={},line={}::{} ({})\n",
                escape_property(&change.file_path.display().to_string()),
                change.line,
                escape_data(&change.help_text),
                escape_data(&change.rule_name)
            ));
        }
        Ok(output)
    }
}
