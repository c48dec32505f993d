// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn creates_work_dir() {
    let temp = TempDir::new().unwrap();

    outq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized queue"))
        .stdout(predicate::str::contains("Queue: default"));

    assert!(temp.path().join(".outq/config.toml").exists());
    assert!(temp.path().join(".outq/queue.db").exists());
    assert!(temp.path().join(".outq/.gitignore").exists());
}

#[test]
fn fails_if_already_initialized() {
    let temp = init_temp();

    outq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_with_path() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("project");
    std::fs::create_dir_all(&target).unwrap();

    outq()
        .args(["init", "--path", target.to_str().unwrap()])
        .assert()
        .success();

    assert!(target.join(".outq/config.toml").exists());
}

#[test]
fn init_records_remote() {
    let temp = init_temp_with_remote("ws://localhost:7890");
    let config = std::fs::read_to_string(temp.path().join(".outq/config.toml")).unwrap();
    assert!(config.contains("url = \"ws://localhost:7890\""));
}

#[parameterized(
    http = { "http://localhost:7890" },
    no_scheme = { "localhost:7890" },
)]
fn init_rejects_non_websocket_remote(url: &str) {
    let temp = TempDir::new().unwrap();
    outq()
        .args(["init", "--remote", url])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid remote URL"));
}

#[parameterized(
    list = { &["list"] },
    size = { &["size"] },
    flush = { &["flush"] },
    status = { &["status"] },
)]
fn commands_require_init(args: &[&str]) {
    let temp = TempDir::new().unwrap();
    outq()
        .args(args)
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn outq_dir_env_selects_work_dir() {
    let temp = init_temp();
    let elsewhere = TempDir::new().unwrap();

    outq()
        .arg("size")
        .env("OUTQ_DIR", temp.path().join(".outq"))
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout("0\n");
}
