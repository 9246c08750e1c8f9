use std::ffi::OsStr;

use assert_cmd::{assert::Assert, Command};
use predicates::prelude::*;
use serde_json::Value;

fn cmd(data_dir: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::cargo_bin("onewire").unwrap();
    cmd.env("ONEWIRE_DATA_DIR", data_dir)
        .env("ONEWIRE_GATEWAY_ADDRESS", "10.0.0.5")
        .env_remove("ONEWIRE_PUBLISHER_ID")
        .env_remove("ONEWIRE_GATEWAY_ID")
        .env_remove("ONEWIRE_ZONE");
    cmd
}

fn setup_assert(data_dir: impl AsRef<OsStr>, gateway_address: &str) -> Assert {
    cmd(data_dir)
        .env("ONEWIRE_GATEWAY_ADDRESS", gateway_address)
        .arg("setup")
        .assert()
}

fn nodes_assert(data_dir: impl AsRef<OsStr>) -> Assert {
    cmd(data_dir).arg("nodes").assert()
}

fn configure_assert(data_dir: impl AsRef<OsStr>, key: &str, value: &str) -> Assert {
    cmd(data_dir).arg("configure").arg(key).arg(value).assert()
}

fn stdout_lines(assert: &Assert) -> Vec<Value> {
    String::from_utf8_lossy(&assert.get_output().stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn setup_registers_gateway_node() {
    let tempdir = tempfile::tempdir().unwrap();

    let assert = setup_assert(tempdir.path(), "10.0.0.5").success();
    let snapshots = stdout_lines(&assert);
    assert_eq!(snapshots.len(), 1);

    let node = &snapshots[0];
    assert_eq!(node["id"], "gateway");
    assert_eq!(node["nodeType"], "gateway");
    assert_eq!(node["address"], "local/onewire/gateway/$node");
    assert_eq!(node["config"]["address"]["default"], "10.0.0.5");
    assert_eq!(node["config"]["loginName"]["secret"], true);
    assert_eq!(node["config"]["password"]["secret"], true);
}

#[test]
fn setup_is_idempotent() {
    let tempdir = tempfile::tempdir().unwrap();

    setup_assert(tempdir.path(), "10.0.0.5").success();
    setup_assert(tempdir.path(), "10.0.0.5").success();

    let assert = nodes_assert(tempdir.path()).success();
    assert_eq!(stdout_lines(&assert).len(), 1);
}

#[test]
fn nodes_never_show_secrets() {
    let tempdir = tempfile::tempdir().unwrap();

    setup_assert(tempdir.path(), "10.0.0.5").success();
    configure_assert(tempdir.path(), "loginName", "admin").success();
    configure_assert(tempdir.path(), "password", "hunter2").success();

    nodes_assert(tempdir.path())
        .success()
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("admin").not());
}

#[test]
fn configure_address_is_persisted() {
    let tempdir = tempfile::tempdir().unwrap();

    setup_assert(tempdir.path(), "10.0.0.5").success();
    configure_assert(tempdir.path(), "address", "10.0.0.9").success();

    let assert = nodes_assert(tempdir.path()).success();
    let snapshots = stdout_lines(&assert);
    assert_eq!(snapshots[0]["config"]["address"]["value"], "10.0.0.9");
    assert_eq!(snapshots[0]["config"]["address"]["default"], "10.0.0.5");
}

#[test]
fn configure_unknown_key_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();

    setup_assert(tempdir.path(), "10.0.0.5").success();
    configure_assert(tempdir.path(), "colour", "red")
        .failure()
        .stderr(predicate::str::contains(
            "unknown configuration attribute 'colour'",
        ));

    let assert = nodes_assert(tempdir.path()).success();
    let node = &stdout_lines(&assert)[0];
    assert!(node["config"].get("colour").is_none());
}

#[test]
fn configure_empty_address_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();

    configure_assert(tempdir.path(), "address", "")
        .failure()
        .stderr(predicate::str::contains("invalid value for 'address'"));
}
