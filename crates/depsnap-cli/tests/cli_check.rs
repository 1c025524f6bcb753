use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
  "packages": {
    "app": {"versions": {"1.0.0": {"dependencies": {"lib-a": "^1.0.0"}}}},
    "lib-a": {"versions": {"1.0.0": {}, "1.2.0": {}}}
  }
}"#;

#[allow(deprecated)]
fn depsnap_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depsnap").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("DEPSNAP_REGISTRY")
        .env_remove("RUST_LOG");
    cmd
}

fn snapshot_then(tmp: &TempDir) -> std::path::PathBuf {
    fs::write(tmp.path().join("registry.json"), REGISTRY).unwrap();
    depsnap_cmd(tmp.path())
        .args(["snapshot", "app", "1.0.0", "--registry-file", "registry.json"])
        .assert()
        .success();
    tmp.path().join("testdata").join("app@1.0.0-latest-all.json")
}

#[test]
fn test_check_fresh_snapshot_has_no_drift() {
    let tmp = TempDir::new().unwrap();
    let path = snapshot_then(&tmp);

    depsnap_cmd(tmp.path())
        .arg("check")
        .arg(&path)
        .args(["--registry-file", "registry.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drift."));
}

#[test]
fn test_check_reports_changed_version() {
    let tmp = TempDir::new().unwrap();
    let path = snapshot_then(&tmp);
    let edited = fs::read_to_string(&path).unwrap().replace("1.2.0", "1.0.0");
    fs::write(&path, edited).unwrap();

    depsnap_cmd(tmp.path())
        .arg("check")
        .arg(&path)
        .args(["--registry-file", "registry.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("~ lib-a 1.0.0 -> 1.2.0"))
        .stderr(predicate::str::contains("Snapshot drifted"));
}

#[test]
fn test_check_raw_snapshot_inferred_from_name() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("registry.json"), REGISTRY).unwrap();
    depsnap_cmd(tmp.path())
        .args(["snapshot", "app", "1.0.0", "--raw", "--registry-file", "registry.json"])
        .assert()
        .success();

    depsnap_cmd(tmp.path())
        .args([
            "check",
            "testdata/app@1.0.0-all.json",
            "--registry-file",
            "registry.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drift."));
}

#[test]
fn test_check_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("registry.json"), REGISTRY).unwrap();

    depsnap_cmd(tmp.path())
        .args([
            "check",
            "testdata/app@1.0.0-latest-all.json",
            "--registry-file",
            "registry.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Snapshot error"));
}
