//! Integration tests for the CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn sample_tree() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample_tree")
}

/// `header-audit` pointed at the fixture tree with its config and build graph
fn audit_cmd() -> Command {
    let tree = sample_tree();
    let mut cmd = Command::cargo_bin("header-audit").unwrap();
    cmd.arg("--root")
        .arg(&tree)
        .arg("--config")
        .arg(tree.join("header-audit.toml"))
        .arg("--build-graph")
        .arg(tree.join("gn_desc.json"));
    cmd
}

const EXPECTED_SCAN: &str = "\
media/engine_impl.h ignored (webrtc::engine_impl)

Headers in API directories:
   1   50.0%  api
   1   50.0%  rtc_base
   2  100.0%  TOTAL

Visible headers not in API directories:
  media/engine.h
Total: 1 visible headers not in API directories

Non-public headers transitively #included by public headers:
  media/codec.h
Total: 1 non-public headers #included by public headers

";

#[test]
fn test_cli_scan_help() {
    let mut cmd = Command::cargo_bin("header-audit").unwrap();
    cmd.arg("scan").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("plain text report"));
}

#[test]
fn test_cli_report_help() {
    let mut cmd = Command::cargo_bin("header-audit").unwrap();
    cmd.arg("report").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate the report in a chosen format"));
}

#[test]
fn test_cli_check_help() {
    let mut cmd = Command::cargo_bin("header-audit").unwrap();
    cmd.arg("check").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Check the API surface against thresholds"));
}

#[test]
fn test_cli_scan_sample_tree() {
    audit_cmd()
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::diff(EXPECTED_SCAN));
}

#[test]
fn test_cli_report_json() {
    audit_cmd()
        .arg("report")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"leaked_private\""))
        .stdout(predicate::str::contains("media/codec.h"));
}

#[test]
fn test_cli_report_markdown_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.md");

    audit_cmd()
        .arg("report")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("## Leaked Private Headers"));
    assert!(content.contains("- `media/codec.h`"));
}

#[test]
fn test_cli_check_fails_on_config_threshold() {
    audit_cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 leaked private headers (max 0)"))
        .stderr(predicate::str::contains("media/codec.h"));
}

#[test]
fn test_cli_check_passes_with_override() {
    audit_cmd()
        .arg("check")
        .arg("--max-leaked")
        .arg("5")
        .arg("--max-visible-outside-api")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed!"));
}

#[test]
fn test_cli_rejects_api_prefixed_dir() {
    audit_cmd()
        .arg("--api-dir")
        .arg("api/audio")
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api/"));
}

#[test]
fn test_cli_missing_build_graph() {
    let tree = sample_tree();
    let mut cmd = Command::cargo_bin("header-audit").unwrap();
    cmd.arg("--root")
        .arg(&tree)
        .arg("--no-git")
        .arg("--build-graph")
        .arg(tree.join("does_not_exist.json"))
        .arg("scan");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does_not_exist.json"));
}
