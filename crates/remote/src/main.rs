// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outq-remote: reference WebSocket backend for outq.
//!
//! Keeps one in-memory table per resource and applies the writes that queue
//! flushes send. Resources named with `--reject` refuse every write, which
//! makes it easy to watch records retry and get discarded.

mod server;
#[cfg(test)]
mod server_tests;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// outq-remote: reference backend for outq queues
#[derive(Parser, Debug)]
#[command(name = "outq-remote")]
#[command(about = "Reference WebSocket backend that applies outq mutations in memory")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Refuse every write to this resource (repeatable)
    #[arg(long, value_name = "RESOURCE")]
    reject: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting outq-remote server");
    info!("  Bind address: {}", args.bind);
    for resource in &args.reject {
        info!("  Rejecting writes to: {}", resource);
    }

    let state = state::ServerState::new(args.reject);

    server::run(args.bind, state).await?;

    Ok(())
}
