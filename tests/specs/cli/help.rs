// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help and version output.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use yare::parameterized;

fn tether() -> Command {
    let mut cmd = cargo_bin_cmd!("tether");
    cmd.env_remove("TETHER_CONFIG").env_remove("TETHER_LOG");
    cmd
}

#[parameterized(
    long = { "--help" },
    short = { "-h" },
)]
fn help_shows_usage(flag: &str) {
    tether()
        .arg(flag)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("tether"));
}

#[parameterized(
    header = { "--header" },
    receive = { "--receive" },
    heartbeat = { "--heartbeat-text" },
    max_retries = { "--max-retries" },
    config = { "--config" },
    label = { "--label" },
    verbose = { "--verbose" },
)]
fn help_documents_flag(flag: &str) {
    tether()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(flag));
}

#[test]
fn help_lists_receive_types() {
    tether()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Receive types:"))
        .stdout(predicate::str::contains(
            "Message, TransportEvent, ConnectionState, MachineEvent",
        ));
}

#[test]
fn version_prints_name_and_version() {
    tether()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tether "))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_is_rejected() {
    tether()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-such-flag"));
}
