// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use outq_core::OperationKind;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn parse_kind(s: &str) -> Result<OperationKind, String> {
    s.parse().map_err(|e: outq_core::Error| e.to_string())
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "outq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Queue writes while offline and replay them when the remote is reachable")]
#[command(
    long_about = "Queue writes while offline and replay them when the remote is reachable.\n\n\
    Mutations are stored durably in .outq/queue.db and flushed in order to a\n\
    WebSocket remote, either on demand or by the long-running 'outq run'."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a queue in the current directory (or specified path)
    #[command(after_help = "\
Examples:
  outq init                                Initialize with no remote
  outq init --remote ws://localhost:7890   Initialize and flush to a remote
  outq init --queue user-42                Use a custom storage key")]
    Init {
        /// Remote WebSocket URL (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,

        /// Storage key for the queue
        #[arg(long, value_parser = non_empty_string)]
        queue: Option<String>,

        /// Path to initialize (defaults to current directory)
        #[arg(long)]
        path: Option<String>,
    },

    /// Queue a mutation
    #[command(after_help = "\
Examples:
  outq enqueue orders insert '{\"id\": \"o1\", \"qty\": 1}'
  outq enqueue orders update '{\"id\": \"o1\", \"qty\": 2}'
  outq enqueue orders update '{\"qty\": 0}' --match-column sku --match-value '\"A-7\"'
  outq enqueue orders delete --match-value '\"o1\"'")]
    Enqueue {
        /// Remote table or collection
        #[arg(value_parser = non_empty_string)]
        resource: String,

        /// Operation kind (insert, update, delete)
        #[arg(value_parser = parse_kind)]
        kind: OperationKind,

        /// Row data as a JSON object (required for insert and update)
        payload: Option<String>,

        /// Column that identifies the row for update and delete
        #[arg(long, default_value = outq_core::DEFAULT_MATCH_COLUMN)]
        match_column: String,

        /// Value the match column must equal (JSON; bare text is taken as a string)
        #[arg(long)]
        match_value: Option<String>,
    },

    /// List queued mutations, oldest first
    List {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print the number of queued mutations
    Size,

    /// Remove every queued mutation without sending it
    Clear,

    /// Remove one queued mutation without sending it
    #[command(arg_required_else_help = true)]
    Drop {
        /// Record ID
        id: String,
    },

    /// Run one flush pass against the configured remote
    Flush {
        /// Only print failures
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show queue and remote status
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Watch connectivity and flush automatically until interrupted
    #[command(after_help = "\
Flushes when the remote becomes reachable, every flush_interval_secs, and on
SIGUSR1. Stop with Ctrl-C.")]
    Run {
        /// Append logs to .outq/outq.log instead of stderr
        #[arg(long)]
        log_file: bool,
    },
}
