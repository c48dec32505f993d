// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod enqueue;
pub mod flush;
pub mod init;
pub mod list;
pub mod prune;
pub mod run;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use outq_core::{QueueStore, SqliteStorage};

use crate::config::{find_work_dir, get_db_path, Config};
use crate::error::Result;

/// Helper to open the queue from the current context.
pub fn open_queue() -> Result<(QueueStore, Config, PathBuf)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let queue = open_queue_at(&work_dir, &config)?;
    Ok((queue, config, work_dir))
}

/// Opens the queue stored under `work_dir`.
pub fn open_queue_at(work_dir: &std::path::Path, config: &Config) -> Result<QueueStore> {
    let storage = SqliteStorage::open(&get_db_path(work_dir))?;
    Ok(QueueStore::open(config.queue.clone(), Arc::new(storage))?)
}
