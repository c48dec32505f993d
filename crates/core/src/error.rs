// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for outq-core operations.

use thiserror::Error;

/// All possible errors that can occur in outq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("queue store not initialized\n  hint: bind a storage backend with QueueStore::init first")]
    NotInitialized,

    #[error("queue store already initialized")]
    AlreadyInitialized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("remote execution failed: {0}")]
    RemoteExecution(String),

    #[error("Max retries exceeded for {id} after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        id: String,
        attempts: u32,
        last_error: String,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for failures that belong to a single record rather than
    /// to the queue itself.
    pub fn is_record_failure(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::RemoteExecution(_) | Error::MaxRetriesExceeded { .. }
        )
    }
}

/// A specialized Result type for outq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
