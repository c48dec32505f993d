// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::config::{get_db_path, init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub fn run(remote: Option<String>, queue: Option<String>, path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let mut config = Config::default();
    if let Some(queue) = queue {
        config.queue = queue;
    }
    if let Some(url) = remote.as_deref() {
        config.remote = Some(RemoteConfig::new(url)?);
    }

    let work_dir = init_work_dir(&target_path, &config)?;

    // Create the database now so later commands fail fast on permissions
    outq_core::SqliteStorage::open(&get_db_path(&work_dir))?;

    println!("Initialized queue at {}", work_dir.display());
    println!("Queue: {}", config.queue);
    match config.remote_url() {
        Some(url) => println!("Remote: {}", url),
        None => println!("Remote: none (add one with a [remote] section in config.toml)"),
    }

    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
