//! Checkstyle XML, grouped per file in first-seen order.

use super::{ReportError, Reporter};
use crate::engine::Change;

pub struct CheckstyleReporter;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('\n', "&#10;")
}

impl Reporter for CheckstyleReporter {
    fn render(&self, changes: &[Change]) -> Result<String, ReportError> {
        let mut files: Vec<(String, Vec<&Change>)> = Vec::new();
        for change in changes {
            let name = change.file_path.display().to_string();
            match files.iter_mut().find(|(file, _)| *file == name) {
                Some((_, group)) => group.push(change),
                None => files.push((name, vec![change])),
            }
        }

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<checkstyle version=\"4.3\">\n");
        for (file, group) in &files {
            xml.push_str(&format!("  <file name=\"{}\">\n", escape_xml(file)));
            for change in group {
                xml.push_str(&format!(
                    "    <error line=\"{}\" column=\"{}\" severity=\"warning\" message=\"{}\" source=\"livespan.rules.{}\"/>\n",
                    change.line,
                    change.column,
                    escape_xml(&change.help_text),
                    escape_xml(&change.rule_name)
                ));
            }
            xml.push_str("  </file>\n");
        }
        xml.push_str("</checkstyle>\n");
        Ok(xml)
    }
}
