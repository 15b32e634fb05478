use super::{ReportError, Reporter};
use crate::engine::Change;

/// Pretty-printed JSON array of changes.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, changes: &[Change]) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(changes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_changes;

    #[test]
    fn test_json_fields() {
        let text = JsonReporter.render(&sample_changes()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &parsed[0];
        assert_eq!(first["file_path"], "Sources/A.swift");
        assert_eq!(first["line"], 3);
        assert_eq!(first["column"], 8);
        assert_eq!(first["rule_name"], "typeSugar");
        assert_eq!(parsed.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(JsonReporter.render(&[]).unwrap(), "[]");
    }
}
