use std::ffi::OsStr;

use assert_cmd::{assert::Assert, Command};
use predicates::prelude::*;

fn config_set_assert(data_dir: impl AsRef<OsStr>, key: &str, value: &str) -> Assert {
    let mut cmd = Command::cargo_bin("onewire").unwrap();
    cmd.env("ONEWIRE_DATA_DIR", data_dir)
        .arg("config-set")
        .arg(key)
        .arg(value)
        .assert()
}

fn config_get_assert(data_dir: impl AsRef<OsStr>, key: &str) -> Assert {
    let mut cmd = Command::cargo_bin("onewire").unwrap();
    cmd.env("ONEWIRE_DATA_DIR", data_dir)
        .arg("config-get")
        .arg(key)
        .assert()
}

#[test]
fn set_and_get_string_field() {
    let tempdir = tempfile::tempdir().unwrap();

    config_set_assert(tempdir.path(), "gatewayAddress", "10.0.0.5").success();
    config_get_assert(tempdir.path(), "gatewayAddress")
        .success()
        .stdout("10.0.0.5");
}

#[test]
fn set_and_get_numeric_field() {
    let tempdir = tempfile::tempdir().unwrap();

    config_set_assert(tempdir.path(), "pollInterval", "15").success();
    config_get_assert(tempdir.path(), "pollInterval")
        .success()
        .stdout("15");
}

#[test]
fn unset_ids_read_as_defaults() {
    let tempdir = tempfile::tempdir().unwrap();

    config_get_assert(tempdir.path(), "publisherId")
        .success()
        .stdout("onewire");
    config_get_assert(tempdir.path(), "gatewayId")
        .success()
        .stdout("gateway");
}

#[test]
fn unknown_field_fails() {
    let tempdir = tempfile::tempdir().unwrap();

    config_get_assert(tempdir.path(), "colour")
        .failure()
        .stdout("")
        .stderr(predicate::str::contains(
            "Error: unknown app config field 'colour'",
        ));
}

#[test]
fn invalid_policy_is_not_stored() {
    let tempdir = tempfile::tempdir().unwrap();

    config_set_assert(tempdir.path(), "reconnectFailure", "retry").failure();
    config_get_assert(tempdir.path(), "reconnectFailure")
        .success()
        .stdout("keep");
}
