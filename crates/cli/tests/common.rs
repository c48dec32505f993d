// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn outq() -> Command {
    let mut cmd = cargo_bin_cmd!("outq");
    cmd.env_remove("OUTQ_DIR");
    cmd
}

/// Helper to create an initialized temp directory with no remote
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    outq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create an initialized temp directory pointing at `url`
pub fn init_temp_with_remote(url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    outq()
        .args(["init", "--remote", url])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// A ws:// URL on a local port nothing listens on.
pub fn dead_remote_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{port}")
}

/// Helper to enqueue a mutation and return its ID
pub fn enqueue(temp: &TempDir, args: &[&str]) -> String {
    let output = outq()
        .arg("enqueue")
        .args(args)
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "enqueue failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn list_json(temp: &TempDir) -> serde_json::Value {
    let output = outq()
        .args(["list", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}
