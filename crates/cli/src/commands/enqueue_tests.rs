// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use outq_core::Filter;
use serde_json::json;
use yare::parameterized;

#[test]
fn insert_takes_object_payload() {
    let op = build_operation(
        OperationKind::Insert,
        Some(r#"{"id": "o1", "qty": 1}"#),
        "id".to_string(),
        None,
    )
    .unwrap();
    assert_eq!(op.kind(), OperationKind::Insert);
    assert_eq!(op.payload().unwrap()["qty"], json!(1));
}

#[test]
fn update_resolves_match_value_from_payload() {
    let op = build_operation(
        OperationKind::Update,
        Some(r#"{"id": "o1", "qty": 2}"#),
        "id".to_string(),
        None,
    )
    .unwrap();
    assert_eq!(op.filter().unwrap(), Some(Filter::eq("id", "o1")));
}

#[test]
fn update_with_explicit_match() {
    let op = build_operation(
        OperationKind::Update,
        Some(r#"{"qty": 0}"#),
        "sku".to_string(),
        Some(r#""A-7""#),
    )
    .unwrap();
    assert_eq!(op.filter().unwrap(), Some(Filter::eq("sku", "A-7")));
}

#[parameterized(
    json_number = { "42", json!(42) },
    json_string = { r#""o1""#, json!("o1") },
    bare_text = { "o1", json!("o1") },
)]
fn delete_match_value_parsing(raw: &str, expected: serde_json::Value) {
    let op = build_operation(OperationKind::Delete, None, "id".to_string(), Some(raw)).unwrap();
    assert_eq!(op.filter().unwrap(), Some(Filter::eq("id", expected)));
}

#[test]
fn delete_without_match_value_is_accepted() {
    let op = build_operation(OperationKind::Delete, None, "id".to_string(), None).unwrap();
    assert!(op.filter().is_err());
}

#[parameterized(
    insert_missing = { OperationKind::Insert, None, None },
    update_missing = { OperationKind::Update, None, None },
    not_object = { OperationKind::Insert, Some("[1, 2]"), None },
    not_json = { OperationKind::Update, Some("{id: 1}"), None },
    delete_with_payload = { OperationKind::Delete, Some("{}"), Some("1") },
    insert_with_match = { OperationKind::Insert, Some("{}"), Some("1") },
)]
fn invalid_arguments(kind: OperationKind, payload: Option<&str>, match_value: Option<&str>) {
    let result = build_operation(kind, payload, "id".to_string(), match_value);
    assert!(matches!(result, Err(Error::InvalidPayload(_))));
}
