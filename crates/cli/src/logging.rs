// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! Short commands log warnings to stderr. `outq run` logs at `info`, to a file
//! under the work dir when asked. `RUST_LOG` overrides either default.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logging for one-shot commands.
pub fn setup_cli_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logging for the long-running coordinator.
///
/// Appends to `log_path` when given, falling back to stderr if it cannot be
/// opened.
pub fn setup_run_logging(log_path: Option<&Path>) {
    let file = log_path.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let result = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter("info"))
            .with_writer(file)
            .with_ansi(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter("info"))
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
