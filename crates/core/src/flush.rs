// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flush engine: replays queued mutations against a remote executor.
//!
//! A pass takes a snapshot of the queue and executes every record once, in
//! FIFO order. There is no batching and no rollback: each record succeeds or
//! fails on its own.
//!
//! - Success removes the record.
//! - Failure (validation or remote) bumps `retry_count` and sets
//!   `last_error`. Once `retry_count` reaches [`MAX_RETRIES`] the record is
//!   discarded and reported in [`FlushResult::discarded`].
//!
//! Per-record failures never fail the pass; only queue storage errors do.

use std::time::Instant;

use crate::adapter::RemoteExecutor;
use crate::error::{Error, Result};
use crate::queue::{QueueStore, WriteBack};
use crate::record::{MutationRecord, Operation, MAX_RETRIES};

/// Failure of a single record during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub id: String,
    pub error: String,
}

/// Summary of one flush pass.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "discarded records are lost writes and must be surfaced"]
pub struct FlushResult {
    /// Records delivered and removed.
    pub flushed: usize,
    /// Records discarded after exhausting their retries.
    pub failed: usize,
    /// Records still queued after the write-back.
    pub remaining: usize,
    /// Every failure seen in this pass, in replay order.
    pub errors: Vec<RecordError>,
    /// Records dropped permanently in this pass, with their final state.
    pub discarded: Vec<MutationRecord>,
}

impl FlushResult {
    /// Returns true if the pass saw no failures at all.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of records the pass attempted.
    pub fn attempted(&self) -> usize {
        self.flushed + self.errors.len()
    }
}

/// Executes one record against the executor.
pub async fn execute<E>(executor: &E, record: &MutationRecord) -> Result<()>
where
    E: RemoteExecutor + ?Sized,
{
    let resource = record.resource.as_str();
    let outcome = match &record.operation {
        Operation::Insert { payload } => executor.insert(resource, payload).await,
        Operation::Update { payload, .. } => {
            let filter = record.operation.filter()?.ok_or_else(|| {
                Error::Validation(format!("update on '{resource}' has no row filter"))
            })?;
            executor.update(resource, payload, &filter).await
        }
        Operation::Delete { .. } => {
            let filter = record.operation.filter()?.ok_or_else(|| {
                Error::Validation(format!("delete on '{resource}' has no row filter"))
            })?;
            executor.delete(resource, &filter).await
        }
    };
    outcome.map_err(|e| Error::RemoteExecution(e.message))
}

impl QueueStore {
    /// Runs one flush pass against `executor`.
    ///
    /// # Errors
    ///
    /// Only queue storage failures are returned; per-record failures are
    /// collected in [`FlushResult::errors`].
    pub async fn flush<E>(&self, executor: &E) -> Result<FlushResult>
    where
        E: RemoteExecutor + ?Sized,
    {
        let started = Instant::now();
        let snapshot = self.list_all().await?;
        if snapshot.is_empty() {
            return Ok(FlushResult::default());
        }

        let mut result = FlushResult::default();
        let mut changes = WriteBack::default();

        for mut record in snapshot {
            match execute(executor, &record).await {
                Ok(()) => {
                    tracing::debug!(id = %record.id, resource = %record.resource, "flushed mutation");
                    result.flushed += 1;
                    changes.removed.insert(record.id);
                }
                Err(e) => {
                    record.record_failure(e.to_string());
                    if record.is_exhausted() {
                        let discard = Error::MaxRetriesExceeded {
                            id: record.id.clone(),
                            attempts: record.retry_count,
                            last_error: e.to_string(),
                        };
                        tracing::warn!(
                            id = %record.id,
                            resource = %record.resource,
                            max_retries = MAX_RETRIES,
                            "discarding mutation: {}",
                            e
                        );
                        result.failed += 1;
                        result.errors.push(RecordError {
                            id: record.id.clone(),
                            error: discard.to_string(),
                        });
                        changes.removed.insert(record.id.clone());
                        result.discarded.push(record);
                    } else {
                        tracing::debug!(
                            id = %record.id,
                            retry_count = record.retry_count,
                            "mutation failed: {}",
                            e
                        );
                        result.errors.push(RecordError {
                            id: record.id.clone(),
                            error: e.to_string(),
                        });
                        changes.retried.insert(record.id.clone(), record);
                    }
                }
            }
        }

        result.remaining = self.write_back(changes).await?;

        tracing::info!(
            flushed = result.flushed,
            failed = result.failed,
            remaining = result.remaining,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "flush pass complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
