// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation records: the persisted description of one pending write.
//!
//! Every record targets a single named remote resource (a table or
//! collection) and carries exactly one [`Operation`]. Records are replayed in
//! the order they were enqueued.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Number of failed attempts after which a record is discarded.
pub const MAX_RETRIES: u32 = 5;

/// Column used to locate rows when an operation names none.
pub const DEFAULT_MATCH_COLUMN: &str = "id";

/// Field name to value mapping, kept in insertion order.
pub type Payload = serde_json::Map<String, Value>;

fn default_match_column() -> String {
    DEFAULT_MATCH_COLUMN.to_string()
}

/// The write a record performs against its resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Insert `payload` as a new row.
    Insert { payload: Payload },

    /// Update rows where `match_column = match_value` with `payload`.
    ///
    /// When `match_value` is absent it is read from `payload[match_column]`
    /// at execution time.
    Update {
        payload: Payload,
        #[serde(default = "default_match_column")]
        match_column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        match_value: Option<Value>,
    },

    /// Delete rows where `match_column = match_value`.
    ///
    /// A missing `match_value` is only rejected at execution time.
    Delete {
        #[serde(default = "default_match_column")]
        match_column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        match_value: Option<Value>,
    },
}

/// The kind of an [`Operation`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "insert" => Ok(OperationKind::Insert),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            other => Err(Error::Validation(format!(
                "unknown operation '{other}'\n  hint: valid operations are: insert, update, delete"
            ))),
        }
    }
}

/// Equality filter applied to update and delete operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    /// Creates a `column = value` filter.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Returns true if `row[column]` equals the filter value.
    pub fn matches(&self, row: &Payload) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

impl Operation {
    /// Creates an insert operation.
    pub fn insert(payload: Payload) -> Self {
        Operation::Insert { payload }
    }

    /// Creates an update matched on `id`, resolved from the payload.
    pub fn update(payload: Payload) -> Self {
        Operation::Update {
            payload,
            match_column: default_match_column(),
            match_value: None,
        }
    }

    /// Creates an update with an explicit match column and optional value.
    pub fn update_matching(
        payload: Payload,
        match_column: impl Into<String>,
        match_value: Option<Value>,
    ) -> Self {
        Operation::Update {
            payload,
            match_column: match_column.into(),
            match_value,
        }
    }

    /// Creates a delete operation.
    pub fn delete(match_column: impl Into<String>, match_value: Option<Value>) -> Self {
        Operation::Delete {
            match_column: match_column.into(),
            match_value,
        }
    }

    /// Builds an operation from its kind and the loose arguments feature code
    /// usually has at hand.
    pub fn from_parts(
        kind: OperationKind,
        payload: Payload,
        match_column: Option<String>,
        match_value: Option<Value>,
    ) -> Self {
        let match_column = match_column.unwrap_or_else(default_match_column);
        match kind {
            OperationKind::Insert => Operation::Insert { payload },
            OperationKind::Update => Operation::Update {
                payload,
                match_column,
                match_value,
            },
            OperationKind::Delete => Operation::Delete {
                match_column,
                match_value,
            },
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert { .. } => OperationKind::Insert,
            Operation::Update { .. } => OperationKind::Update,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }

    /// Returns the payload written by this operation, if any.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Operation::Insert { payload } | Operation::Update { payload, .. } => Some(payload),
            Operation::Delete { .. } => None,
        }
    }

    /// Resolves the row filter for update and delete operations.
    ///
    /// Returns `Ok(None)` for inserts. Fails with [`Error::Validation`] when no
    /// non-null match value can be found.
    pub fn filter(&self) -> Result<Option<Filter>> {
        match self {
            Operation::Insert { .. } => Ok(None),
            Operation::Update {
                payload,
                match_column,
                match_value,
            } => {
                let value = match_value
                    .clone()
                    .or_else(|| payload.get(match_column).cloned())
                    .filter(|v| !v.is_null())
                    .ok_or_else(|| {
                        Error::Validation(format!(
                            "update has no value for match column '{match_column}'"
                        ))
                    })?;
                Ok(Some(Filter::eq(match_column.clone(), value)))
            }
            Operation::Delete {
                match_column,
                match_value,
            } => {
                let value = match_value.clone().filter(|v| !v.is_null()).ok_or_else(|| {
                    Error::Validation(format!(
                        "delete requires a match value for column '{match_column}'"
                    ))
                })?;
                Ok(Some(Filter::eq(match_column.clone(), value)))
            }
        }
    }
}

/// One pending write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationRecord {
    /// Unique within the queue; see [`crate::id`].
    pub id: String,
    /// Target remote collection or table.
    pub resource: String,
    pub operation: Operation,
    pub created_at: DateTime<Utc>,
    /// Failed execution attempts so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Message from the most recent failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl MutationRecord {
    /// Creates a fresh record with no attempts.
    pub fn new(
        id: String,
        resource: impl Into<String>,
        operation: Operation,
        created_at: DateTime<Utc>,
    ) -> Self {
        MutationRecord {
            id,
            resource: resource.into(),
            operation,
            created_at,
            retry_count: 0,
            last_error: None,
        }
    }

    /// Counts a failed attempt and remembers its message.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(message.into());
    }

    /// Returns true once the record has used up its attempts.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= MAX_RETRIES
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
