// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use outq_core::FlushResult;

use crate::error::Result;
use crate::probe::TcpProbe;
use crate::remote::WebSocketExecutor;

use super::open_queue;

pub async fn run(quiet: bool) -> Result<()> {
    let (queue, config, _) = open_queue()?;
    let remote = config.require_remote()?;

    if queue.is_empty().await? {
        if !quiet {
            println!("Queue is empty.");
        }
        return Ok(());
    }

    // Same gate the coordinator applies: an unreachable remote would only
    // burn retries.
    let probe = TcpProbe::for_url(&remote.url, remote.request_timeout())?;
    if !probe.probe().await.is_online() {
        println!("Remote {} is unreachable; nothing flushed.", remote.url);
        return Ok(());
    }

    let executor = WebSocketExecutor::new(remote.url.clone(), remote.request_timeout());
    let result = queue.flush(&executor).await?;
    executor.close().await;

    print!("{}", format_result(&result, quiet));
    Ok(())
}

/// Human summary of a pass; failures are always included.
pub(crate) fn format_result(result: &FlushResult, quiet: bool) -> String {
    let mut out = String::new();
    if !quiet {
        out.push_str(&format!(
            "Flushed {}, failed {}, remaining {}.\n",
            result.flushed, result.failed, result.remaining
        ));
    }
    for err in &result.errors {
        out.push_str(&format!("  {}: {}\n", err.id, err.error));
    }
    for record in &result.discarded {
        out.push_str(&format!(
            "Discarded {} ({} {}) after {} attempts.\n",
            record.id,
            record.operation.kind(),
            record.resource,
            record.retry_count
        ));
    }
    out
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
