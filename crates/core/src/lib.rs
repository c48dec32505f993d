// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outq-core: offline mutation queue and flush engine.
//!
//! This crate provides the record model, the durable [`QueueStore`], the
//! [`RemoteExecutor`] seam and the flush pass shared by the outq CLI, the
//! sync coordinator and the reference remote server.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outq_core::{Operation, QueueStore, SqliteStorage};
//!
//! let storage = Arc::new(SqliteStorage::open(Path::new(".outq/queue.db"))?);
//! let queue = QueueStore::open("user-42", storage)?;
//! queue.enqueue("orders", Operation::insert(row)).await?;
//!
//! // Later, once the network is back
//! let result = queue.flush(&executor).await?;
//! ```

pub mod adapter;
pub mod clock;
pub mod error;
pub mod flush;
pub mod id;
pub mod protocol;
pub mod queue;
pub mod record;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::{AdapterError, AdapterFuture, AdapterResult, RemoteExecutor};
pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use flush::{FlushResult, RecordError};
pub use queue::{QueueStore, DEFAULT_QUEUE_KEY};
pub use record::{
    Filter, MutationRecord, Operation, OperationKind, Payload, DEFAULT_MATCH_COLUMN, MAX_RETRIES,
};
pub use storage::{KeyValueStore, MemoryStorage, SqliteStorage};
