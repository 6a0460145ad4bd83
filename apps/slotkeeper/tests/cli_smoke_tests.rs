//! CLI smoke tests for the slotkeeper binary
//!
//! Every test that touches configuration points `home_dir` at a temp
//! directory so nothing is written under the real home.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_slotkeeper(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slotkeeper"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute slotkeeper")
}

fn write_config(dir: &Path, database_url: &str) -> PathBuf {
    let home = dir.join("home");
    let yaml = format!(
        r#"home_dir: "{home}"
database:
  url: "{database_url}"
  max_conns: 2
logging:
  default:
    console_level: "warn"
    file: ""
modules:
  scheduling:
    io_timeout: "2s"
    identity_provider:
      base_url: "http://127.0.0.1:9"
      timeout: "1s"
"#,
        home = home.to_string_lossy().replace('\\', "/"),
    );
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).expect("Failed to write config");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_slotkeeper(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");
    let out = stdout(&output);
    assert!(out.contains("Usage:"), "Should contain usage information");
    for sub in ["check", "migrate", "calendar", "users", "appointments"] {
        assert!(out.contains(sub), "Should list '{sub}' subcommand");
    }
    assert!(out.contains("--config"), "Should mention config option");
    assert!(out.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_slotkeeper(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    assert!(stdout(&output).contains("slotkeeper 0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_slotkeeper(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    assert!(stderr(&output).contains("error"));
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_slotkeeper(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    assert!(
        stderr(&output).contains("config file not found"),
        "Should mention config file issue: {}",
        stderr(&output)
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_slotkeeper(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_invalid_module_config_fails_check() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");
    let home = temp_dir.path().join("home");
    std::fs::write(
        &config_path,
        format!(
            "home_dir: \"{}\"\nmodules:\n  scheduling:\n    io_timeout: \"soon\"\n",
            home.to_string_lossy().replace('\\', "/")
        ),
    )
    .expect("Failed to write file");

    let output = run_slotkeeper(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("scheduling"), "{}", stderr(&output));
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Configuration check passed"));
    assert!(temp_dir.path().join("home").is_dir(), "home_dir is created");
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&["-c", config_path.to_str().unwrap(), "--print-config"]);

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("home_dir:"));
    assert!(out.contains("sqlite://db/slots.db"));
    assert!(out.contains("scheduling"));
}

#[test]
fn test_cli_mock_flag_overrides_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&[
        "--config",
        config_path.to_str().unwrap(),
        "--mock",
        "--print-config",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("sqlite::memory:"));
}

#[test]
fn test_cli_calendar_on_empty_store() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&[
        "--config",
        config_path.to_str().unwrap(),
        "--mock",
        "calendar",
        "2025-08",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let calendar: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("calendar is JSON");
    assert_eq!(calendar["month"], "2025-08");
    assert_eq!(calendar["scheduled"], serde_json::json!([]));
}

#[test]
fn test_cli_calendar_rejects_malformed_month() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&[
        "--config",
        config_path.to_str().unwrap(),
        "--mock",
        "calendar",
        "August",
    ]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("scheduling.input.malformed.v1"), "{err}");
    assert!(err.contains("400"), "{err}");
}

#[test]
fn test_cli_appointments_for_unknown_subject() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let output = run_slotkeeper(&[
        "--config",
        config_path.to_str().unwrap(),
        "--mock",
        "appointments",
        "nobody",
    ]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("scheduling.identity.not_found.v1"));
}

#[test]
fn test_cli_migrate_creates_file_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "sqlite://db/slots.db");

    let migrate = run_slotkeeper(&["--config", config_path.to_str().unwrap(), "migrate"]);
    assert!(migrate.status.success(), "{}", stderr(&migrate));
    assert!(temp_dir.path().join("home/db/slots.db").is_file());

    // Migrations are idempotent and the schema serves queries.
    let users = run_slotkeeper(&["--config", config_path.to_str().unwrap(), "users"]);
    assert!(users.status.success(), "{}", stderr(&users));
    let listed: serde_json::Value = serde_json::from_str(&stdout(&users)).expect("users is JSON");
    assert_eq!(listed, serde_json::json!([]));
}
