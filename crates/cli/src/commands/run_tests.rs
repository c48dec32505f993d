// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn lock_is_exclusive() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("run.lock");

    let held = acquire_lock(&path).unwrap();
    assert!(matches!(acquire_lock(&path), Err(Error::AlreadyRunning)));

    drop(held);
    acquire_lock(&path).unwrap();
}
