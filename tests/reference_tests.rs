//! Site, department and primer command tests

mod common;

use common::{
    create_test_dept, create_test_drop, create_test_primer, create_test_site, pdt,
    setup_test_project,
};
use predicates::prelude::*;

// ============================================================================
// Site Tests
// ============================================================================

#[test]
fn test_site_new_and_list() {
    let tmp = setup_test_project();
    create_test_site(&tmp, "LKC", "Lake City");
    create_test_site(&tmp, "RAD", "Radford");

    pdt()
        .current_dir(tmp.path())
        .args(["site", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lake City"))
        .stdout(predicate::str::contains("Radford"))
        .stdout(predicate::str::contains("SITE@1"));

    pdt()
        .current_dir(tmp.path())
        .args(["site", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_site_duplicate_code_rejected() {
    let tmp = setup_test_project();
    create_test_site(&tmp, "LKC", "Lake City");

    pdt()
        .current_dir(tmp.path())
        .args(["site", "new", "--code", "lkc", "--name", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_site_show_by_short_id() {
    let tmp = setup_test_project();
    let id = create_test_site(&tmp, "LKC", "Lake City");

    pdt()
        .current_dir(tmp.path())
        .args(["site", "show", "SITE@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lake City"))
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn test_site_show_json() {
    let tmp = setup_test_project();
    let id = create_test_site(&tmp, "LKC", "Lake City");

    let output = pdt()
        .current_dir(tmp.path())
        .args(["site", "show", &id, "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["site_code"], "LKC");
    assert_eq!(value["status"], "active");
}

#[test]
fn test_site_list_tsv() {
    let tmp = setup_test_project();
    create_test_site(&tmp, "LKC", "Lake City");

    pdt()
        .current_dir(tmp.path())
        .args(["site", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SHORT\tCODE\tNAME\tSTATUS"))
        .stdout(predicate::str::contains("SITE@1\tLKC\tLake City\tactive"));
}

#[test]
fn test_show_unknown_id_fails() {
    let tmp = setup_test_project();

    pdt()
        .current_dir(tmp.path())
        .args(["site", "show", "SITE@9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No site found"));
}

#[test]
fn test_site_edit_runs_editor() {
    let tmp = setup_test_project();
    create_test_site(&tmp, "LKC", "Lake City");

    pdt()
        .current_dir(tmp.path())
        .args(["site", "edit", "SITE@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opening"));
}

// ============================================================================
// Department Tests
// ============================================================================

#[test]
fn test_dept_links_site() {
    let tmp = setup_test_project();
    let site = create_test_site(&tmp, "LKC", "Lake City");
    let dept = create_test_dept(&tmp, "Primer Lab", Some("SITE@1"));

    let content = std::fs::read_to_string(
        tmp.path()
            .join(format!("reference/departments/{}.pdt.yaml", dept)),
    )
    .unwrap();
    assert!(content.contains(&format!("site: {}", site)));

    pdt()
        .current_dir(tmp.path())
        .args(["dept", "show", "DEPT@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LKC - Lake City"));
}

#[test]
fn test_dept_unknown_site_fails() {
    let tmp = setup_test_project();

    pdt()
        .current_dir(tmp.path())
        .args(["dept", "new", "--name", "Lab", "--site", "SITE@4"])
        .assert()
        .failure();
}

#[test]
fn test_delete_referenced_site_requires_force() {
    let tmp = setup_test_project();
    let site = create_test_site(&tmp, "LKC", "Lake City");
    create_test_dept(&tmp, "Primer Lab", Some(&site));

    pdt()
        .current_dir(tmp.path())
        .args(["site", "delete", &site])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still referenced"));

    pdt()
        .current_dir(tmp.path())
        .args(["site", "delete", &site, "--force"])
        .assert()
        .success();

    pdt()
        .current_dir(tmp.path())
        .args(["site", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_delete_unreferenced_dept() {
    let tmp = setup_test_project();
    let dept = create_test_dept(&tmp, "Primer Lab", None);

    pdt()
        .current_dir(tmp.path())
        .args(["dept", "delete", "DEPT@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    assert!(!tmp
        .path()
        .join(format!("reference/departments/{}.pdt.yaml", dept))
        .exists());
}

// ============================================================================
// Primer Tests
// ============================================================================

#[test]
fn test_primer_new_stores_spec() {
    let tmp = setup_test_project();
    let id = create_test_primer(&tmp, "Small Rifle #41", &["--firing-pin-min", "0.055"]);

    let content = std::fs::read_to_string(
        tmp.path().join(format!("reference/primers/{}.pdt.yaml", id)),
    )
    .unwrap();
    assert!(content.contains("cert: commercial"));
    assert!(content.contains("test_h_plus: 11"));
    assert!(content.contains("firing_pin_min: 0.055"));
}

#[test]
fn test_primer_list_filters_by_cert() {
    let tmp = setup_test_project();
    create_test_primer(&tmp, "Small Rifle", &[]);
    create_test_primer(&tmp, "Large Rifle", &["--cert", "mil"]);

    pdt()
        .current_dir(tmp.path())
        .args(["primer", "list", "--cert", "mil", "--count"])
        .assert()
        .success()
        .stdout("1\n");

    pdt()
        .current_dir(tmp.path())
        .args(["primer", "show", "PRMR@2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample size 50"));
}

#[test]
fn test_delete_primer_with_drop_tests_requires_force() {
    let tmp = setup_test_project();
    let primer = create_test_primer(&tmp, "Small Rifle", &[]);
    create_test_drop(&tmp, &primer, "regular-run");

    pdt()
        .current_dir(tmp.path())
        .args(["primer", "delete", "PRMR@1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DROP-"));
}
