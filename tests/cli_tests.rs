//! CLI and basic command tests

mod common;

use common::{create_test_site, pdt, setup_test_project};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    pdt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("drop test"));
}

#[test]
fn test_version_displays() {
    pdt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pdt"));
}

#[test]
fn test_unknown_command_fails() {
    pdt()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_generate_script() {
    pdt()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pdt"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    pdt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".pdt/config.yaml").exists());
    assert!(tmp.path().join("reference/sites").is_dir());
    assert!(tmp.path().join("reference/departments").is_dir());
    assert!(tmp.path().join("reference/primers").is_dir());
    assert!(tmp.path().join("drop-tests").is_dir());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();

    pdt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_keeps_existing_entities() {
    let tmp = setup_test_project();
    let id = create_test_site(&tmp, "LKC", "Lake City");

    pdt()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();

    assert!(tmp
        .path()
        .join(format!("reference/sites/{}.pdt.yaml", id))
        .exists());
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();

    pdt()
        .current_dir(tmp.path())
        .args(["site", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project"));
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_validate_empty_project_passes() {
    let tmp = setup_test_project();

    pdt()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));
}

#[test]
fn test_validate_reports_schema_violation() {
    let tmp = setup_test_project();
    let id = create_test_site(&tmp, "LKC", "Lake City");
    let path = tmp.path().join(format!("reference/sites/{}.pdt.yaml", id));

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, format!("{}bogus_field: 1\n", content)).unwrap();

    pdt()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 error(s)"));
}
