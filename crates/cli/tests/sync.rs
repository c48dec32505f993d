// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;

#[test]
fn flush_without_remote_fails_with_hint() {
    let temp = init_temp();
    enqueue(&temp, &["orders", "insert", r#"{"id": "o1"}"#]);

    outq()
        .arg("flush")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn flush_empty_queue_is_noop() {
    let temp = init_temp_with_remote(&dead_remote_url());
    outq()
        .arg("flush")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout("Queue is empty.\n");
}

#[test]
fn flush_unreachable_remote_keeps_records_untouched() {
    let temp = init_temp_with_remote(&dead_remote_url());
    enqueue(&temp, &["orders", "insert", r#"{"id": "o1"}"#]);

    outq()
        .arg("flush")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("unreachable; nothing flushed"));

    let records = list_json(&temp);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["retry_count"], 0);
}

#[test]
fn status_reports_queue_and_remote() {
    let url = dead_remote_url();
    let temp = init_temp_with_remote(&url);
    enqueue(&temp, &["orders", "insert", r#"{"id": "o1"}"#]);

    outq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue: default"))
        .stdout(predicate::str::contains("Pending: 1"))
        .stdout(predicate::str::contains(format!("Remote: {url} (unreachable)")));
}

#[test]
fn status_json() {
    let temp = init_temp();
    let output = outq()
        .args(["status", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(value["pending"], 0);
    assert!(value["remote"].is_null());
    assert_eq!(value["flush_interval_secs"], 30);
}

#[test]
fn run_requires_remote() {
    let temp = init_temp();
    outq()
        .arg("run")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"));
}
