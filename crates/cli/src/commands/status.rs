// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use outq_core::MutationRecord;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::probe::TcpProbe;

use super::open_queue;

/// Snapshot printed by `outq status`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub queue: String,
    pub pending: usize,
    /// Records that have failed at least once.
    pub retrying: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub remote: Option<String>,
    /// `None` when no remote is configured.
    pub reachable: Option<bool>,
    pub flush_interval_secs: u64,
}

impl StatusReport {
    pub(crate) fn new(config: &Config, records: &[MutationRecord], reachable: Option<bool>) -> Self {
        StatusReport {
            queue: config.queue.clone(),
            pending: records.len(),
            retrying: records.iter().filter(|r| r.retry_count > 0).count(),
            oldest: records.first().map(|r| r.created_at),
            remote: config.remote_url().map(String::from),
            reachable,
            flush_interval_secs: config.flush_interval_secs,
        }
    }

    pub(crate) fn to_text(&self) -> String {
        let mut lines = vec![format!("Queue: {}", self.queue)];
        lines.push(format!(
            "Pending: {}{}",
            self.pending,
            if self.retrying > 0 {
                format!(" ({} retrying)", self.retrying)
            } else {
                String::new()
            }
        ));
        if let Some(oldest) = self.oldest {
            lines.push(format!("Oldest: {}", oldest.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        match (&self.remote, self.reachable) {
            (Some(url), Some(true)) => lines.push(format!("Remote: {} (reachable)", url)),
            (Some(url), _) => lines.push(format!("Remote: {} (unreachable)", url)),
            (None, _) => lines.push("Remote: not configured".to_string()),
        }
        if self.flush_interval_secs == 0 {
            lines.push("Periodic flush: disabled".to_string());
        } else {
            lines.push(format!("Periodic flush: every {}s", self.flush_interval_secs));
        }
        lines.join("\n")
    }
}

pub async fn run(output: OutputFormat) -> Result<()> {
    let (queue, config, _) = open_queue()?;
    let records = queue.list_all().await?;

    let reachable = match &config.remote {
        Some(remote) => {
            let probe = TcpProbe::for_url(&remote.url, remote.request_timeout())?;
            Some(probe.probe().await.is_online())
        }
        None => None,
    };

    let report = StatusReport::new(&config, &records, reachable);
    match output {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
