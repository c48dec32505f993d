// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of pending mutations.
//!
//! The queue is stored as one JSON array under a single storage key. A
//! [`QueueStore`] is an explicit value, one per logical queue (for example
//! one per signed-in user), and must be bound to a storage backend with
//! [`QueueStore::init`] before use.
//!
//! Every read-modify-write of the stored list runs under the store's async
//! mutex, so enqueues never interleave with a flush write-back on the same
//! store. Clones share the mutex and the binding.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::record::{MutationRecord, Operation};
use crate::storage::KeyValueStore;

/// Storage key used when none is given.
pub const DEFAULT_QUEUE_KEY: &str = "outq.mutations";

/// Handle to a durable mutation queue.
#[derive(Clone)]
pub struct QueueStore {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    key: String,
    storage: OnceLock<Arc<dyn KeyValueStore>>,
    clock: Arc<dyn ClockSource>,
    /// Serializes read-modify-write cycles on the stored list.
    write_lock: Mutex<()>,
}

/// Changes a flush pass applies to the stored list.
#[derive(Debug, Default)]
pub(crate) struct WriteBack {
    /// Records to drop (delivered or discarded).
    pub removed: HashSet<String>,
    /// Records that failed and stay queued, with their new retry state.
    pub retried: HashMap<String, MutationRecord>,
}

impl QueueStore {
    /// Creates an unbound queue stored under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_clock(key, Arc::new(SystemClock))
    }

    /// Creates an unbound queue with a custom clock (for testing).
    pub fn with_clock(key: impl Into<String>, clock: Arc<dyn ClockSource>) -> Self {
        QueueStore {
            inner: Arc::new(QueueInner {
                key: key.into(),
                storage: OnceLock::new(),
                clock,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Creates a queue under `key` and binds it to `storage`.
    pub fn open(key: impl Into<String>, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = Self::new(key);
        store.init(storage)?;
        Ok(store)
    }

    /// Binds the storage backend. Must precede every other operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if a backend is already bound.
    pub fn init(&self, storage: Arc<dyn KeyValueStore>) -> Result<()> {
        self.inner
            .storage
            .set(storage)
            .map_err(|_| Error::AlreadyInitialized)
    }

    /// Returns true once [`init`](Self::init) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.inner.storage.get().is_some()
    }

    /// Returns the storage key this queue lives under.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    fn storage(&self) -> Result<&Arc<dyn KeyValueStore>> {
        self.inner.storage.get().ok_or(Error::NotInitialized)
    }

    async fn load(&self, storage: &dyn KeyValueStore) -> Result<Vec<MutationRecord>> {
        match storage.get(&self.inner.key).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn save(&self, storage: &dyn KeyValueStore, records: &[MutationRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        storage.set(&self.inner.key, raw).await
    }

    /// Appends a new mutation and returns its id.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotInitialized`] before `init`, with
    /// [`Error::Validation`] for an empty resource name, and propagates
    /// storage failures.
    pub async fn enqueue(
        &self,
        resource: impl Into<String>,
        operation: Operation,
    ) -> Result<String> {
        let storage = self.storage()?;
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err(Error::Validation("resource name cannot be empty".to_string()));
        }

        let _guard = self.inner.write_lock.lock().await;
        let mut records = self.load(storage.as_ref()).await?;

        let created_at = self.inner.clock.now();
        let id = generate_unique_id(&created_at, |candidate| {
            records.iter().any(|r| r.id == candidate)
        });
        tracing::debug!(
            id = %id,
            resource = %resource,
            operation = %operation.kind(),
            "enqueued mutation"
        );
        records.push(MutationRecord::new(id.clone(), resource, operation, created_at));
        self.save(storage.as_ref(), &records).await?;

        Ok(id)
    }

    /// Returns the number of queued mutations.
    pub async fn size(&self) -> Result<usize> {
        Ok(self.list_all().await?.len())
    }

    /// Returns true if nothing is queued.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.size().await? == 0)
    }

    /// Returns a snapshot of all queued mutations in replay order.
    pub async fn list_all(&self) -> Result<Vec<MutationRecord>> {
        let storage = self.storage()?;
        let _guard = self.inner.write_lock.lock().await;
        self.load(storage.as_ref()).await
    }

    /// Removes every queued mutation.
    pub async fn clear(&self) -> Result<()> {
        let storage = self.storage()?;
        let _guard = self.inner.write_lock.lock().await;
        storage.remove(&self.inner.key).await?;
        tracing::info!(queue = %self.inner.key, "cleared mutation queue");
        Ok(())
    }

    /// Removes a single mutation by id. Returns false if it was not queued.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let storage = self.storage()?;
        let _guard = self.inner.write_lock.lock().await;
        let mut records = self.load(storage.as_ref()).await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(storage.as_ref(), &records).await?;
        Ok(true)
    }

    /// Applies a flush pass to the current stored list.
    ///
    /// Reads the list again under the lock so that records enqueued after the
    /// pass took its snapshot are kept, in their original position. Returns
    /// the number of records left queued.
    pub(crate) async fn write_back(&self, changes: WriteBack) -> Result<usize> {
        let storage = self.storage()?;
        let _guard = self.inner.write_lock.lock().await;
        let mut retried = changes.retried;

        let records: Vec<MutationRecord> = self
            .load(storage.as_ref())
            .await?
            .into_iter()
            .filter(|r| !changes.removed.contains(&r.id))
            .map(|r| retried.remove(&r.id).unwrap_or(r))
            .collect();

        self.save(storage.as_ref(), &records).await?;
        Ok(records.len())
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("key", &self.inner.key)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
