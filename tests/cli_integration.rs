//! Integration tests for the CLI
//!
//! Tests the format, rules and init commands against a temporary project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const UNFORMATTED: &str = "let values :Array<Int> = []\nlet handler: ((Int, String)) -> Bool\n";
const FORMATTED: &str = "let values: [Int] = []\nlet handler: (Int, String) -> Bool\n";

/// Helper to create a project with one Swift file and one excluded file
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let sources = dir.path().join("Sources");
    fs::create_dir_all(sources.join("Generated")).unwrap();
    fs::write(sources.join("App.swift"), UNFORMATTED).unwrap();
    fs::write(sources.join("Generated/Model.swift"), UNFORMATTED).unwrap();
    fs::write(sources.join("notes.txt"), "let x :Int").unwrap();
    dir
}

fn livespan(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_livespan"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run livespan")
}

#[test]
fn test_format_writes_files() {
    let dir = setup_project();
    let output = livespan(dir.path(), &["format", "Sources"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let app = fs::read_to_string(dir.path().join("Sources/App.swift")).unwrap();
    assert_eq!(app, FORMATTED);
    let notes = fs::read_to_string(dir.path().join("Sources/notes.txt")).unwrap();
    assert_eq!(notes, "let x :Int");
}

#[test]
fn test_exclude_from_local_config() {
    let dir = setup_project();
    fs::write(
        dir.path().join("livespan.toml"),
        "version = \"1.0.0\"\n[options]\nexclude = [\"Sources/Generated\"]\n",
    )
    .unwrap();
    let output = livespan(dir.path(), &["format", "Sources"]);
    assert!(output.status.success());

    let generated = fs::read_to_string(dir.path().join("Sources/Generated/Model.swift")).unwrap();
    assert_eq!(generated, UNFORMATTED);
    let app = fs::read_to_string(dir.path().join("Sources/App.swift")).unwrap();
    assert_eq!(app, FORMATTED);
}

#[test]
fn test_lint_does_not_write_and_fails() {
    let dir = setup_project();
    let output = livespan(dir.path(), &["format", "--lint", "Sources/App.swift"]);
    assert_eq!(output.status.code(), Some(1));
    let app = fs::read_to_string(dir.path().join("Sources/App.swift")).unwrap();
    assert_eq!(app, UNFORMATTED);
}

#[test]
fn test_lint_clean_file_succeeds() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Clean.swift"), FORMATTED).unwrap();
    let output = livespan(dir.path(), &["format", "--lint", "Clean.swift"]);
    assert!(output.status.success());
}

#[test]
fn test_json_report_on_stdout() {
    let dir = setup_project();
    let output = livespan(
        dir.path(),
        &["format", "--lint", "--reporter", "json", "Sources/App.swift"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let changes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rules: Vec<_> = changes
        .as_array()
        .unwrap()
        .iter()
        .map(|change| change["rule_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(rules, ["typeSugar", "redundantParens", "typeColonSpacing"]);
}

#[test]
fn test_github_report_to_file() {
    let dir = setup_project();
    let output = livespan(
        dir.path(),
        &[
            "format",
            "--lint",
            "--reporter",
            "github",
            "--report",
            "report.txt",
            "Sources/App.swift",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.starts_with("::warning file=Sources/App.swift,line=1::"), "{report}");
    assert!(report.contains("(typeColonSpacing)"));
}

#[test]
fn test_diff_output() {
    let dir = setup_project();
    let output = livespan(dir.path(), &["format", "--diff", "Sources/App.swift"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-let values :Array<Int> = []"));
    assert!(stdout.contains("+let values: [Int] = []"));
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = setup_project();
    fs::write(dir.path().join("bad.toml"), "version = \"9.0.0\"\n").unwrap();
    let output = livespan(dir.path(), &["format", "--config", "bad.toml", "Sources"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported version"));
    let app = fs::read_to_string(dir.path().join("Sources/App.swift")).unwrap();
    assert_eq!(app, UNFORMATTED);
}

#[test]
fn test_rules_command() {
    let dir = TempDir::new().unwrap();
    let output = livespan(dir.path(), &["rules"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["typeSugar", "redundantParens", "typeColonSpacing"] {
        assert!(stdout.contains(name), "missing {name}");
    }
}

#[test]
fn test_init_then_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let first = livespan(dir.path(), &["init"]);
    assert!(first.status.success());
    let written = fs::read_to_string(dir.path().join("livespan.toml")).unwrap();
    assert!(written.contains("version = \"1.0.0\""));

    let second = livespan(dir.path(), &["init"]);
    assert!(!second.status.success());
    let forced = livespan(dir.path(), &["init", "--force"]);
    assert!(forced.status.success());
}
