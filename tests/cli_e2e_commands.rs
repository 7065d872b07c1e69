//! End-to-end tests for the `scm-mirror` binary.
//!
//! These tests invoke the actual CLI and check its output and exit codes from
//! a user's perspective. Remotes are local repositories built with `git`.

mod common;

use assert_fs::prelude::*;
use common::prelude::*;

/// Test that --help lists every subcommand
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("scm-mirror");

    let output = cmd.arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in [
        "sync",
        "latest",
        "since",
        "checkout",
        "validate",
        "check-connection",
        "handle",
    ] {
        assert!(stdout.contains(name), "help should mention {}", name);
    }
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_accepts_good_url() {
    let mut cmd = cargo_bin_cmd!("scm-mirror");

    cmd.args(["--color", "never", "validate", "https://example.com/repo.git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] https://example.com/repo.git is valid"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_validate_rejects_bad_url() {
    let mut cmd = cargo_bin_cmd!("scm-mirror");

    cmd.args(["--color", "never", "validate", "crap"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[ERR] url: Invalid URL format"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_check_connection_malformed() {
    let mut cmd = cargo_bin_cmd!("scm-mirror");

    cmd.args(["--color", "never", "check-connection", "not a url"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[ERR] Malformed URL"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_then_latest_json() {
    let remote = RemoteRepo::new();
    remote.write("a.txt", "one");
    let tip = remote.commit("first");
    let mirror = MirrorDir::new();

    cargo_bin_cmd!("scm-mirror")
        .args(["--color", "never", "sync", &remote.url()])
        .arg(mirror.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[SYNC] Cloning"))
        .stdout(predicate::str::contains("is up to date"));

    cargo_bin_cmd!("scm-mirror")
        .args(["latest", "--no-sync", "--json", &remote.url()])
        .arg(mirror.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"revision\": \"{}\"", tip)))
        .stdout(predicate::str::contains("\"revisionComment\": \"first\""))
        .stdout(predicate::str::contains("\"fileName\": \"a.txt\""));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_latest_human_readable() {
    let remote = RemoteRepo::new();
    remote.write("a.txt", "one");
    let tip = remote.commit("first");
    let mirror = MirrorDir::new();

    cargo_bin_cmd!("scm-mirror")
        .args(["latest", &remote.url()])
        .arg(mirror.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("revision {}", tip)))
        .stdout(predicate::str::contains("Author: test@example.com"))
        .stdout(predicate::str::contains("added    a.txt"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_since_reports_new_and_up_to_date() {
    let remote = RemoteRepo::new();
    remote.write("a.txt", "one");
    let first = remote.commit("first");
    remote.write("a.txt", "two");
    let second = remote.commit("second");
    let mirror = MirrorDir::new();

    cargo_bin_cmd!("scm-mirror")
        .args(["since", "--json", &remote.url()])
        .arg(mirror.path())
        .arg(&first)
        .assert()
        .success()
        .stdout(predicate::str::contains(second.as_str()))
        .stdout(predicate::str::contains(format!("\"revision\": \"{}\"", first)).not());

    cargo_bin_cmd!("scm-mirror")
        .args(["--color", "never", "since", &remote.url()])
        .arg(mirror.path())
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] No new revisions"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_checkout_command() {
    let remote = RemoteRepo::new();
    remote.write("a.txt", "one");
    let first = remote.commit("first");
    remote.write("a.txt", "two");
    remote.commit("second");
    let mirror = MirrorDir::new();

    cargo_bin_cmd!("scm-mirror")
        .args(["--color", "never", "checkout", &remote.url()])
        .arg(mirror.path())
        .arg(&first)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "[OK] Checked out to revision {}",
            first
        )));

    assert_eq!(mirror.read("a.txt"), "one");
    assert_eq!(mirror.head(), first);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_handle_scm_configuration() {
    cargo_bin_cmd!("scm-mirror")
        .args(["handle", "scm-configuration"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\": 200"))
        .stdout(predicate::str::contains("\"display-name\": \"URL\""));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_handle_unknown_request() {
    cargo_bin_cmd!("scm-mirror")
        .args(["handle", "go-fish"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": 404"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_handle_reads_body_from_stdin() {
    cargo_bin_cmd!("scm-mirror")
        .args(["handle", "validate-scm-configuration", "--body", "-"])
        .write_stdin(r#"{"scm-configuration": {"url": {"value": "crap"}}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid URL format"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_config_file_selects_branch() {
    let remote = RemoteRepo::new();
    remote.write("a.txt", "main");
    remote.commit("on main");
    remote.branch("release");
    remote.write("a.txt", "release");
    let release_tip = remote.commit("on release");
    remote.switch("main");
    let mirror = MirrorDir::new();
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("mirror.yaml");
    config.write_str("branch: release\ngc: false\n").unwrap();

    cargo_bin_cmd!("scm-mirror")
        .arg("--config")
        .arg(config.path())
        .args(["latest", "--json", &remote.url()])
        .arg(mirror.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(release_tip.as_str()));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_invalid_config_file_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("mirror.yaml");
    config.write_str("no-such-key: true\n").unwrap();

    cargo_bin_cmd!("scm-mirror")
        .arg("--config")
        .arg(config.path())
        .args(["validate", "https://example.com/repo.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
