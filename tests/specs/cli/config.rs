// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Settings errors reported before any connection is attempted.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn tether() -> Command {
    let mut cmd = cargo_bin_cmd!("tether");
    cmd.env_remove("TETHER_CONFIG").env_remove("TETHER_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("tether.toml");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn missing_url_fails_with_hint() {
    tether()
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: no url given"))
        .stderr(predicate::str::contains("hint:"));
}

#[parameterized(
    no_colon = { "nocolon" },
    empty_name = { ":value" },
)]
fn malformed_header_is_rejected(header: &str) {
    tether()
        .args(["-H", header, "ws://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid header"))
        .stderr(predicate::str::contains("NAME:VALUE"));
}

#[parameterized(
    plain_string = { "String" },
    lowercase = { "message" },
)]
fn unsupported_receive_type_is_rejected(receive: &str) {
    tether()
        .args(["--receive", receive, "ws://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!(
            "type {receive} is not supported"
        )));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    tether()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read config"));
}

#[parameterized(
    not_toml = { "url = " },
    unknown_key = { "url = \"ws://127.0.0.1:1\"\ncolour = true\n" },
    unknown_strategy = { "url = \"ws://127.0.0.1:1\"\n[backoff]\nstrategy = \"fibonacci\"\n" },
)]
fn malformed_config_file_is_reported(content: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, content);
    tether()
        .args(["--config", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn invalid_backoff_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "url = \"ws://127.0.0.1:1\"\n[backoff]\nstrategy = \"linear\"\nbase_ms = 0\n",
    );
    tether()
        .args(["--config", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid backoff"));
}

#[test]
fn config_path_can_come_from_the_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "receive = \"String\"\nurl = \"ws://127.0.0.1:1\"\n");
    tether()
        .env("TETHER_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("type String is not supported"));
}

#[test]
fn flags_override_the_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "receive = \"String\"\nurl = \"ws://127.0.0.1:1\"\n");
    tether()
        .args(["--config", &path, "--receive", "Message", "--max-retries", "0"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("gave up reconnecting"));
}
