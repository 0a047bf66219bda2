//! CLI smoke tests for dashnorm.
//!
//! These tests drive the binary end to end against temporary dashboard
//! trees and verify output, exit codes, and on-disk results.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the dashnorm binary.
fn dashnorm_cmd() -> Command {
  cargo_bin_cmd!("dashnorm")
}

/// Write a dashboard file relative to the tree root.
fn write_dashboard(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

/// A small tree with one unnormalized dashboard.
fn temp_tree() -> TempDir {
  let temp = TempDir::new().unwrap();
  write_dashboard(
    temp.path(),
    "docker/engine.json",
    r#"{
  "id": 7,
  "__inputs": [{"name": "DS_PROMETHEUS"}],
  "title": "Engine",
  "panels": [{"datasource": "${DS_PROMETHEUS}"}]
}"#,
  );
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  dashnorm_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  dashnorm_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("dashnorm"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["apply", "plan"] {
    dashnorm_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// apply
// =============================================================================

#[test]
fn apply_normalizes_in_place() {
  let temp = temp_tree();

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Normalized dashboards: 1"))
    .stdout(predicate::str::contains("Cross-references fixed: 0"))
    .stdout(predicate::str::contains("Files rewritten: 1"));

  let text = fs::read_to_string(temp.path().join("docker/engine.json")).unwrap();
  assert!(text.contains(r#""uid": "docker-engine""#));
  assert!(text.contains(r#""type": "prometheus""#));
  assert!(!text.contains("__inputs"));
  assert!(text.ends_with('\n'));
}

#[test]
fn apply_is_idempotent() {
  let temp = temp_tree();

  dashnorm_cmd().arg("apply").arg("--root").arg(temp.path()).assert().success();

  // Second apply finds nothing left to rewrite.
  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Files rewritten: 0"));
}

#[test]
fn apply_keep_inputs_preserves_metadata() {
  let temp = temp_tree();

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .arg("--keep-inputs")
    .assert()
    .success();

  let text = fs::read_to_string(temp.path().join("docker/engine.json")).unwrap();
  assert!(text.contains("__inputs"));
}

#[test]
fn apply_recompute_strategy_renames_from_paths() {
  let temp = TempDir::new().unwrap();
  write_dashboard(
    temp.path(),
    "node/full.json",
    r#"{"title": "Node", "uid": "imported-1860"}"#,
  );

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .arg("--uid-strategy")
    .arg("recompute")
    .assert()
    .success();

  let text = fs::read_to_string(temp.path().join("node/full.json")).unwrap();
  assert!(text.contains(r#""uid": "node-full""#));
}

#[test]
fn apply_warns_on_deprecated_panels() {
  let temp = TempDir::new().unwrap();
  write_dashboard(
    temp.path(),
    "old.json",
    r#"{"title": "Old", "panels": [{"type": "angular"}]}"#,
  );

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("deprecated Angular panels in old.json"));
}

// =============================================================================
// plan
// =============================================================================

#[test]
fn plan_reports_changes_without_writing() {
  let temp = temp_tree();
  let before = fs::read_to_string(temp.path().join("docker/engine.json")).unwrap();

  dashnorm_cmd()
    .arg("plan")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("docker/engine.json"))
    .stdout(predicate::str::contains("Would rewrite 1 of 1 dashboard(s)"));

  let after = fs::read_to_string(temp.path().join("docker/engine.json")).unwrap();
  assert_eq!(before, after);
}

#[test]
fn plan_on_normalized_tree_reports_no_changes() {
  let temp = temp_tree();

  dashnorm_cmd().arg("apply").arg("--root").arg(temp.path()).assert().success();

  dashnorm_cmd()
    .arg("plan")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("No changes"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn missing_root_exits_2() {
  let temp = TempDir::new().unwrap();

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path().join("nonexistent"))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("dashboards root not found"));
}

#[test]
fn corrupt_dashboard_json_exits_3() {
  let temp = TempDir::new().unwrap();
  write_dashboard(temp.path(), "bad.json", "not valid json {{{");

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .code(3)
    .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn corrupt_manifest_exits_3() {
  let temp = TempDir::new().unwrap();
  write_dashboard(temp.path(), "a.json", r#"{"title": "A"}"#);
  write_dashboard(temp.path(), "manifest.json", "{{{");

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .assert()
    .code(3)
    .stderr(predicate::str::contains("manifest"));
}

#[test]
fn missing_patches_file_fails() {
  let temp = temp_tree();

  dashnorm_cmd()
    .arg("apply")
    .arg("--root")
    .arg(temp.path())
    .arg("--patches")
    .arg("/nonexistent/patches.json")
    .assert()
    .failure();
}
