// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outq_core::{Operation, OperationKind, Payload};
use serde_json::Value;

use crate::error::{Error, Result};

use super::open_queue;

pub async fn run(
    resource: String,
    kind: OperationKind,
    payload: Option<String>,
    match_column: String,
    match_value: Option<String>,
) -> Result<()> {
    let operation = build_operation(kind, payload.as_deref(), match_column, match_value.as_deref())?;
    let (queue, _, _) = open_queue()?;
    let id = queue.enqueue(resource, operation).await?;
    println!("{}", id);
    Ok(())
}

/// Turns command-line arguments into an operation.
pub(crate) fn build_operation(
    kind: OperationKind,
    payload: Option<&str>,
    match_column: String,
    match_value: Option<&str>,
) -> Result<Operation> {
    let payload = match (kind, payload) {
        (OperationKind::Delete, Some(_)) => {
            return Err(Error::InvalidPayload(
                "delete takes no payload; use --match-value".to_string(),
            ))
        }
        (OperationKind::Delete, None) => Payload::new(),
        (_, Some(raw)) => parse_payload(raw)?,
        (_, None) => {
            return Err(Error::InvalidPayload(format!(
                "{} requires a payload",
                kind
            )))
        }
    };
    if kind == OperationKind::Insert && match_value.is_some() {
        return Err(Error::InvalidPayload(
            "insert does not take --match-value".to_string(),
        ));
    }
    let match_value = match_value.map(parse_match_value);
    Ok(Operation::from_parts(
        kind,
        payload,
        Some(match_column),
        match_value,
    ))
}

fn parse_payload(raw: &str) -> Result<Payload> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::InvalidPayload("expected a JSON object".to_string())),
        Err(e) => Err(Error::InvalidPayload(e.to_string())),
    }
}

/// JSON if it parses, otherwise the literal text as a string.
fn parse_match_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
