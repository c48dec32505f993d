// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory tables backing the reference server.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use outq_core::protocol::RemoteAction;
use outq_core::Payload;

/// Shared server state: one row list per resource.
#[derive(Clone, Default)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

#[derive(Default)]
struct ServerStateInner {
    tables: Mutex<HashMap<String, Vec<Payload>>>,
    /// Resources that refuse every write.
    rejected: HashSet<String>,
}

impl ServerState {
    /// Creates empty tables; writes to `rejected` resources always fail.
    pub fn new(rejected: impl IntoIterator<Item = String>) -> Self {
        ServerState {
            inner: Arc::new(ServerStateInner {
                tables: Mutex::new(HashMap::new()),
                rejected: rejected.into_iter().collect(),
            }),
        }
    }

    /// Applies a write and returns the number of rows it touched.
    ///
    /// Update merges the row's fields into every matching row. A write that
    /// matches nothing still succeeds with zero affected rows.
    pub async fn apply(&self, resource: &str, action: RemoteAction) -> Result<usize, String> {
        if self.inner.rejected.contains(resource) {
            return Err(format!("writes to '{}' are rejected", resource));
        }

        let mut tables = self.inner.tables.lock().await;
        let rows = tables.entry(resource.to_string()).or_default();

        let affected = match action {
            RemoteAction::Insert { row } => {
                rows.push(row);
                1
            }
            RemoteAction::Update { row, filter } => {
                let mut count = 0;
                for existing in rows.iter_mut().filter(|r| filter.matches(r)) {
                    for (key, value) in &row {
                        existing.insert(key.clone(), value.clone());
                    }
                    count += 1;
                }
                count
            }
            RemoteAction::Delete { filter } => {
                let before = rows.len();
                rows.retain(|r| !filter.matches(r));
                before - rows.len()
            }
        };

        Ok(affected)
    }

    /// Returns a copy of a resource's rows in insertion order.
    #[cfg(test)]
    pub async fn rows(&self, resource: &str) -> Vec<Payload> {
        self.inner
            .tables
            .lock()
            .await
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}
