// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the outq CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'outq init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("no remote configured\n  hint: run 'outq init --remote ws://host:port' or add a [remote] section to .outq/config.toml")]
    NoRemote,

    #[error("invalid remote URL '{0}'\n  hint: remote URLs must start with ws:// or wss://")]
    InvalidRemoteUrl(String),

    #[error("invalid payload: {0}\n  hint: payloads are JSON objects, e.g. '{{\"id\": \"o1\"}}'")]
    InvalidPayload(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("another 'outq run' is already watching this queue")]
    AlreadyRunning,

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Queue(#[from] outq_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for outq CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
