// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outq - queue writes while offline and replay them later.
//!
//! This crate provides the `outq` CLI on top of [`outq_core`] and
//! [`outq_sync`]: project configuration, a WebSocket
//! [`RemoteExecutor`](outq_core::RemoteExecutor), a TCP connectivity probe,
//! and the commands themselves.
//!
//! ```rust,ignore
//! use outq::{find_work_dir, Config};
//!
//! let work_dir = find_work_dir()?;
//! let config = Config::load(&work_dir)?;
//! let executor = outq::remote::WebSocketExecutor::new(url, timeout);
//! ```

mod cli;
mod commands;
mod logging;

pub mod config;
pub mod error;
pub mod probe;
pub mod remote;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config, RemoteConfig};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    if !matches!(command, Command::Run { .. }) {
        logging::setup_cli_logging();
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    rt.block_on(run_async(command))
}

async fn run_async(command: Command) -> Result<()> {
    match command {
        Command::Init {
            remote,
            queue,
            path,
        } => commands::init::run(remote, queue, path),
        Command::Enqueue {
            resource,
            kind,
            payload,
            match_column,
            match_value,
        } => commands::enqueue::run(resource, kind, payload, match_column, match_value).await,
        Command::List { output } => commands::list::run(output).await,
        Command::Size => commands::list::size().await,
        Command::Clear => commands::prune::clear().await,
        Command::Drop { id } => commands::prune::drop_record(&id).await,
        Command::Flush { quiet } => commands::flush::run(quiet).await,
        Command::Status { output } => commands::status::run(output).await,
        Command::Run { log_file } => commands::run::run(log_file).await,
    }
}
