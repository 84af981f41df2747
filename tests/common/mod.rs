//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a pdt command isolated from the caller's environment
pub fn pdt() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("pdt"));
    cmd.env_remove("PDT_FORMAT")
        .env("PDT_AUTHOR", "tester")
        .env("PDT_EDITOR", "true");
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    pdt().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a `new` command with `--format id` and return the created ID
fn create_with(tmp: &TempDir, args: &[&str]) -> String {
    let output = pdt()
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test site
pub fn create_test_site(tmp: &TempDir, code: &str, name: &str) -> String {
    create_with(tmp, &["site", "new", "--code", code, "--name", name])
}

/// Helper to create a test department
pub fn create_test_dept(tmp: &TempDir, name: &str, site: Option<&str>) -> String {
    let mut args = vec!["dept", "new", "--name", name];
    if let Some(site) = site {
        args.extend(["--site", site]);
    }
    create_with(tmp, &args)
}

/// Helper to create a primer with the graded example spec
/// (H+ type 5, H- type 2, test 11/3, retest 10/2)
///
/// Commercial unless `extra` carries its own `--cert`.
pub fn create_test_primer(tmp: &TempDir, primer_type: &str, extra: &[&str]) -> String {
    let mut args = vec!["primer", "new", "--type", primer_type];
    if !extra.contains(&"--cert") {
        args.extend(["--cert", "comm"]);
    }
    args.extend([
        "--h-plus-type",
        "5",
        "--h-minus-type",
        "2",
        "--test-h-plus",
        "11",
        "--test-h-minus",
        "3",
        "--retest-h-plus",
        "10",
        "--retest-h-minus",
        "2",
    ]);
    args.extend_from_slice(extra);
    create_with(tmp, &args)
}

/// Helper to create a drop test for a primer
pub fn create_test_drop(tmp: &TempDir, primer: &str, test_type: &str) -> String {
    create_with(
        tmp,
        &[
            "drop",
            "new",
            "--primer",
            primer,
            "--type",
            test_type,
            "--lot",
            "L-100",
            "--inspector",
            "J. Doe",
            "--test-date",
            "2024-03-01",
            "--mfg-date",
            "2024-02-20",
        ],
    )
}

/// Record the graded example: levels 4-8 = 25, 20, 10, 3, 0
pub fn record_graded_counts(tmp: &TempDir, drop_id: &str) {
    pdt()
        .current_dir(tmp.path())
        .args(["drop", "record", drop_id, "4=25", "5=20", "6=10", "7=3", "8=0"])
        .assert()
        .success();
}
