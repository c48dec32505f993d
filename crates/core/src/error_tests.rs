// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_initialized = { Error::NotInitialized, "not initialized" },
    validation = { Error::Validation("delete requires a match value".into()), "match value" },
    remote = { Error::RemoteExecution("connection reset".into()), "connection reset" },
    storage = { Error::Storage("disk full".into()), "disk full" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn max_retries_display_names_record_and_cause() {
    let err = Error::MaxRetriesExceeded {
        id: "1700000000000-deadbeef".into(),
        attempts: 5,
        last_error: "timeout".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("Max retries exceeded"));
    assert!(msg.contains("1700000000000-deadbeef"));
    assert!(msg.contains("timeout"));
}

#[parameterized(
    validation = { Error::Validation("x".into()), true },
    remote = { Error::RemoteExecution("x".into()), true },
    not_initialized = { Error::NotInitialized, false },
    storage = { Error::Storage("x".into()), false },
)]
fn record_failure_classification(err: Error, expected: bool) {
    assert_eq!(err.is_record_failure(), expected);
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
