// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outq run`: the coordinator as a foreground process.
//!
//! 1. Acquires flock so only one runner drains a queue
//! 2. Polls the remote with a TCP probe for connectivity
//! 3. Flushes on reconnect, on the configured interval and on SIGUSR1
//! 4. Stops on Ctrl-C or SIGTERM

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use outq_core::{FlushResult, MutationRecord};
use outq_sync::{Coordinator, CoordinatorConfig, ManualLifecycle};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::config::{find_work_dir, get_lock_path, get_log_path, Config};
use crate::error::{Error, Result};
use crate::logging::setup_run_logging;
use crate::probe::TcpProbe;
use crate::remote::WebSocketExecutor;

use super::open_queue_at;

pub async fn run(log_file: bool) -> Result<()> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let remote = config.require_remote()?.clone();

    setup_run_logging(log_file.then(|| get_log_path(&work_dir)).as_deref());
    let _lock = acquire_lock(&get_lock_path(&work_dir))?;

    let queue = open_queue_at(&work_dir, &config)?;
    let executor = Arc::new(WebSocketExecutor::new(
        remote.url.clone(),
        remote.request_timeout(),
    ));
    let probe = Arc::new(TcpProbe::for_url(&remote.url, remote.request_timeout())?);
    let lifecycle = Arc::new(ManualLifecycle::new());

    let cancel = CancellationToken::new();
    let (handle, mut discards) = Coordinator::new(queue, executor.clone(), probe.clone())
        .with_lifecycle(lifecycle.clone())
        .with_config(CoordinatorConfig::from_interval_secs(config.flush_interval_secs))
        .on_flush(report_flush)
        .on_error(|e| tracing::error!(error = %e, "sync error"))
        .start()
        .await;
    let poller = probe.spawn_polling(config.probe_interval(), cancel.clone());

    println!(
        "Watching queue '{}' ({} pending), remote {}",
        config.queue,
        handle.queue_size(),
        remote.url
    );

    let mut usr1 = signal(SignalKind::user_defined1())?;
    let mut term = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = term.recv() => break,
            _ = usr1.recv() => {
                tracing::info!("flush requested by signal");
                lifecycle.foreground();
            }
            Some(record) = discards.recv() => report_discard(&record),
        }
    }

    cancel.cancel();
    let _ = poller.await;
    handle.shutdown().await;
    executor.close().await;
    while let Some(record) = discards.try_recv() {
        report_discard(&record);
    }

    let status = handle.status();
    println!("Stopped with {} pending.", status.queue_size);
    Ok(())
}

fn report_flush(result: &FlushResult) {
    if result.attempted() == 0 {
        return;
    }
    tracing::info!(
        flushed = result.flushed,
        failed = result.failed,
        remaining = result.remaining,
        "flush complete"
    );
    println!(
        "Flushed {}, failed {}, remaining {}.",
        result.flushed, result.failed, result.remaining
    );
}

fn report_discard(record: &MutationRecord) {
    eprintln!(
        "Discarded {} ({} {}) after {} attempts: {}",
        record.id,
        record.operation.kind(),
        record.resource,
        record.retry_count,
        record.last_error.as_deref().unwrap_or("unknown error")
    );
}

fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    // Try to acquire exclusive lock (non-blocking)
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning)?;

    Ok(file)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
