//! Integration tests for command line handling
//!
//! These only exercise argument parsing and configuration errors, so no Jira
//! server is needed.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
  Command::new(env!("CARGO_BIN_EXE_jira-cli"))
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .expect("Failed to execute jira-cli")
}

#[test]
fn test_help_lists_subcommands() {
  let output = run_cli(&["--help"]);
  assert!(output.status.success());

  let stdout = String::from_utf8_lossy(&output.stdout);
  for subcommand in ["list", "create", "update"] {
    assert!(stdout.contains(subcommand), "help should mention {subcommand}");
  }
  assert!(stdout.contains("--dry-run"));
}

#[test]
fn test_create_requires_project_and_summary() {
  let output = run_cli(&["create", "--summary", "Only a summary"]);
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("--project"), "stderr: {stderr}");
}

#[test]
fn test_create_rejects_unknown_issue_type() {
  let output = run_cli(&[
    "create",
    "--project",
    "PERF",
    "--summary",
    "x",
    "--type",
    "Story",
  ]);
  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Story"));
}

#[test]
fn test_update_needs_issue_or_query() {
  let output = run_cli(&["update", "--status", "Closed"]);
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(
    stderr.contains("--issue") || stderr.contains("--query"),
    "stderr: {stderr}"
  );
}

#[test]
fn test_missing_config_is_reported() {
  let output = run_cli(&["--config", "/nonexistent/jira-cli.yaml", "list"]);
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Config file not found"), "stderr: {stderr}");
}
