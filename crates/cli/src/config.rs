// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.outq/config.toml` and includes:
//! - `queue`: storage key the mutation queue lives under
//! - `flush_interval_secs` / `probe_interval_secs`: timers for `outq run`
//! - `[remote]`: the WebSocket endpoint records are flushed to

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".outq";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "queue.db";
const LOCK_FILE_NAME: &str = "run.lock";
const LOG_FILE_NAME: &str = "outq.log";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Environment variable naming the work directory directly.
pub const WORK_DIR_ENV: &str = "OUTQ_DIR";

/// Project configuration stored in `.outq/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Storage key for the queue.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Seconds between periodic flushes in `outq run` (0 = disabled).
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
    /// Seconds between connectivity probes in `outq run`.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Remote endpoint (optional - without it records only accumulate).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL (`ws://...` or `wss://...`).
    pub url: String,
    /// Max time to wait for connect or a response, in milliseconds (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_flush_interval_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue: default_queue(),
            flush_interval_secs: default_flush_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            remote: None,
        }
    }
}

impl RemoteConfig {
    /// Creates a remote config after checking the URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRemoteUrl`] unless the URL is `ws://` or `wss://`.
    pub fn new(url: &str) -> Result<Self> {
        let remote = RemoteConfig {
            url: url.to_string(),
            request_timeout_ms: default_request_timeout_ms(),
        };
        remote.validate()?;
        Ok(remote)
    }

    pub fn validate(&self) -> Result<()> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() => {}
            _ => return Err(Error::InvalidRemoteUrl(self.url.clone())),
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config(
                "remote.request_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Loads configuration from the given `.outq/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if config.queue.trim().is_empty() {
            return Err(Error::Config("queue name cannot be empty".to_string()));
        }
        if let Some(remote) = &config.remote {
            remote.validate()?;
        }
        Ok(config)
    }

    /// Saves configuration to the given `.outq/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Returns the remote config, or [`Error::NoRemote`].
    pub fn require_remote(&self) -> Result<&RemoteConfig> {
        self.remote.as_ref().ok_or(Error::NoRemote)
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

/// Find the .outq directory.
///
/// `OUTQ_DIR` wins when set; otherwise walks up from the current directory.
pub fn find_work_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(WORK_DIR_ENV) {
        let dir = PathBuf::from(dir);
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return Ok(dir);
        }
        return Err(Error::NotInitialized);
    }
    find_work_dir_from(&std::env::current_dir()?)
}

/// Walks up from `start` looking for a `.outq` directory.
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

pub fn get_lock_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCK_FILE_NAME)
}

pub fn get_log_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOG_FILE_NAME)
}

/// Initialize a new .outq directory at the given path.
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);
    init_work_dir_at(&work_dir, config)?;
    Ok(work_dir)
}

/// Initialize `work_dir` itself as the work directory.
pub fn init_work_dir_at(work_dir: &Path, config: &Config) -> Result<()> {
    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }
    fs::create_dir_all(work_dir)?;
    config.save(work_dir)?;
    write_gitignore(work_dir)?;
    Ok(())
}

/// Write a .gitignore file to the work directory.
///
/// The queue database, lock and log are machine-local state.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let content = "# Local queue state\nqueue.db\nqueue.db-*\nrun.lock\noutq.log\n";
    fs::write(work_dir.join(GITIGNORE_FILE_NAME), content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
