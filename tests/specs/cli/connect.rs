// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connecting to an unreachable server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const UNREACHABLE: &str = "ws://127.0.0.1:1/feed";

fn tether() -> Command {
    let mut cmd = cargo_bin_cmd!("tether");
    cmd.env_remove("TETHER_CONFIG")
        .env_remove("TETHER_LOG")
        .env("NO_COLOR", "1")
        .timeout(Duration::from_secs(30));
    cmd
}

#[test]
fn zero_retries_gives_up_after_the_first_failure() {
    tether()
        .args(["--max-retries", "0", UNREACHABLE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[connecting (session-"))
        .stderr(predicate::str::contains("[disconnected]"))
        .stderr(predicate::str::contains("error: gave up reconnecting"))
        .stderr(predicate::str::contains("waiting to retry").not());
}

#[test]
fn configured_backoff_retries_before_giving_up() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tether.toml");
    fs::write(
        &path,
        format!(
            "url = \"{UNREACHABLE}\"\n\
             [backoff]\n\
             strategy = \"linear\"\n\
             base_ms = 10\n\
             max_retries = 2\n"
        ),
    )
    .unwrap();

    tether()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("[waiting to retry (retry 0 in 10ms)]"))
        .stderr(predicate::str::contains("[waiting to retry (retry 1 in 10ms)]"))
        .stderr(predicate::str::contains("retry 2)]"))
        .stderr(predicate::str::contains("gave up reconnecting"));
}

#[test]
fn stdin_lines_are_dropped_while_not_connected() {
    tether()
        .args(["--max-retries", "0", UNREACHABLE])
        .write_stdin("hello\n")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("gave up reconnecting"));
}
