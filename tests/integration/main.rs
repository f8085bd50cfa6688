//! Integration tests for the `tsdemo` CLI.

#![allow(clippy::unwrap_used)] // Tests can use unwrap for cleaner assertions

mod common;

use assert_cmd::Command;
use common::valid_up_args;
use predicates::prelude::*;

/// Helper to create a command for the tsdemo binary.
fn tsdemo_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("tsdemo"))
}

/// Test that the CLI shows help.
#[test]
fn test_help() {
    tsdemo_cmd().arg("--help").assert().success().stdout(predicate::str::contains("tsdemo"));
}

/// Test that the CLI shows version.
#[test]
fn test_version() {
    tsdemo_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that unrecognized commands fail.
#[test]
fn test_unknown_command() {
    tsdemo_cmd().arg("unknown-command").assert().failure();
}

/// Test that `up` without its mandatory flags fails with usage output.
#[test]
fn test_up_requires_all_parameters() {
    tsdemo_cmd()
        .arg("up")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

/// A downstream-cluster count outside [1,5] is rejected by validation
/// before any network call is made (the hostname here resolves nowhere,
/// so reaching the network would hang instead of exiting).
#[test]
fn test_dsc_count_out_of_range_rejected() {
    let mut cmd = tsdemo_cmd();
    cmd.arg("up");
    for (flag, value) in valid_up_args() {
        if flag == "--dsc-count" {
            cmd.args([flag, "9"]);
        } else {
            cmd.args([flag, value]);
        }
    }
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--dsc-count"));
}

/// Malformed version strings are named in the validation error.
#[test]
fn test_malformed_version_rejected() {
    let mut cmd = tsdemo_cmd();
    cmd.arg("up");
    for (flag, value) in valid_up_args() {
        if flag == "--rancher-version" {
            cmd.args([flag, "2.9"]);
        } else {
            cmd.args([flag, value]);
        }
    }
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--rancher-version"))
        .stderr(predicate::str::contains("vMAJOR.MINOR.PATCH"));
}

/// Hostname flags must be bare hostnames without a scheme.
#[test]
fn test_hostname_with_scheme_rejected() {
    let mut cmd = tsdemo_cmd();
    cmd.arg("up");
    for (flag, value) in valid_up_args() {
        if flag == "--rancher-hostname" {
            cmd.args([flag, "https://rancher.demo.example.com"]);
        } else {
            cmd.args([flag, value]);
        }
    }
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("bare hostname"));
}

/// Test completions generation.
#[test]
fn test_completions() {
    tsdemo_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tsdemo"));
}
