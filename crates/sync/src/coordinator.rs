// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flush coordination.
//!
//! The coordinator watches connectivity and lifecycle sources and a periodic
//! timer, and runs queue flushes in response. At most one flush runs at a
//! time; triggers that arrive while one is in flight are dropped rather than
//! queued. Status is published on a watch channel so hosts can render it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use outq_core::{Error, FlushResult, MutationRecord, Operation, QueueStore, RemoteExecutor, Result};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::connectivity::{ConnectivityObserver, NetworkState};
use crate::lifecycle::{AppState, LifecycleObserver};
use crate::subscription::Subscription;

/// Default interval between periodic flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Called after every completed flush.
pub type FlushCallback = Arc<dyn Fn(&FlushResult) + Send + Sync>;

/// Called for storage failures and permanently discarded records.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Period of the background flush timer. Zero disables it.
    pub flush_interval: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl CoordinatorConfig {
    /// Builds a config from a seconds count; zero disables the timer.
    pub fn from_interval_secs(secs: u64) -> Self {
        Self {
            flush_interval: Duration::from_secs(secs),
        }
    }

    pub fn periodic_enabled(&self) -> bool {
        !self.flush_interval.is_zero()
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub is_online: bool,
    pub queue_size: usize,
    pub last_flush_at: Option<DateTime<Utc>>,
    pub is_flushing: bool,
}

impl SyncStatus {
    pub fn phase(&self) -> SyncPhase {
        if self.is_flushing {
            SyncPhase::Flushing
        } else if self.is_online {
            SyncPhase::IdleOnline
        } else {
            SyncPhase::IdleOffline
        }
    }
}

/// Coarse coordinator state derived from [`SyncStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    IdleOffline,
    IdleOnline,
    Flushing,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncPhase::IdleOffline => "offline",
            SyncPhase::IdleOnline => "online",
            SyncPhase::Flushing => "flushing",
        };
        write!(f, "{s}")
    }
}

/// What caused a flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Connectivity,
    Timer,
    Foreground,
    Manual,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trigger::Start => "start",
            Trigger::Connectivity => "connectivity",
            Trigger::Timer => "timer",
            Trigger::Foreground => "foreground",
            Trigger::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// Why a trigger did not run a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another flush was already running.
    InFlight,
    Offline,
    /// The coordinator has been shut down.
    ShutDown,
}

/// Result of a flush trigger.
#[derive(Debug)]
pub enum FlushOutcome {
    Completed(FlushResult),
    Skipped(SkipReason),
    /// The queue itself could not be read or written.
    Failed(Error),
}

impl FlushOutcome {
    pub fn result(&self) -> Option<&FlushResult> {
        match self {
            FlushOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FlushOutcome::Skipped(_))
    }
}

/// Receiver for records dropped after exhausting their retries.
///
/// Every discarded record is delivered here. If the feed is dropped the
/// coordinator logs each discard at error level instead.
#[derive(Debug)]
#[must_use = "discarded records are only reported through this feed"]
pub struct DiscardFeed {
    rx: mpsc::UnboundedReceiver<MutationRecord>,
}

impl DiscardFeed {
    pub async fn recv(&mut self) -> Option<MutationRecord> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<MutationRecord> {
        self.rx.try_recv().ok()
    }
}

enum Event {
    Network(NetworkState),
    App(AppState),
}

/// State shared between the handle, the event loop and flush tasks.
struct Shared {
    store: QueueStore,
    executor: Arc<dyn RemoteExecutor>,
    online: AtomicBool,
    flushing: AtomicBool,
    status_tx: watch::Sender<SyncStatus>,
    discard_tx: mpsc::UnboundedSender<MutationRecord>,
    on_flush: Option<FlushCallback>,
    on_error: Option<ErrorCallback>,
    cancel_token: CancellationToken,
}

impl Shared {
    fn report_error(&self, err: &Error) {
        if let Some(cb) = &self.on_error {
            cb(err);
        }
    }

    async fn refresh_size(&self) -> Result<usize> {
        let size = self.store.size().await?;
        self.status_tx.send_modify(|s| s.queue_size = size);
        Ok(size)
    }

    async fn run_flush(&self, trigger: Trigger) -> FlushOutcome {
        if self.cancel_token.is_cancelled() {
            tracing::debug!(%trigger, "skipping flush after shutdown");
            return FlushOutcome::Skipped(SkipReason::ShutDown);
        }
        if !self.online.load(Ordering::SeqCst) {
            tracing::debug!(%trigger, "skipping flush while offline");
            return FlushOutcome::Skipped(SkipReason::Offline);
        }
        if self
            .flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(%trigger, "flush already in flight");
            return FlushOutcome::Skipped(SkipReason::InFlight);
        }

        self.status_tx.send_modify(|s| s.is_flushing = true);
        tracing::debug!(%trigger, "flush started");

        let outcome = match self.store.flush(&*self.executor).await {
            Ok(result) => {
                self.deliver_discards(&result);
                let now = Utc::now();
                let online = self.online.load(Ordering::SeqCst);
                self.status_tx.send_modify(|s| {
                    s.queue_size = result.remaining;
                    s.last_flush_at = Some(now);
                    s.is_online = online;
                    s.is_flushing = false;
                });
                if let Some(cb) = &self.on_flush {
                    cb(&result);
                }
                FlushOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(%trigger, error = %e, "flush failed");
                self.status_tx.send_modify(|s| s.is_flushing = false);
                self.report_error(&e);
                FlushOutcome::Failed(e)
            }
        };

        self.flushing.store(false, Ordering::SeqCst);
        outcome
    }

    fn deliver_discards(&self, result: &FlushResult) {
        for record in &result.discarded {
            let err = Error::MaxRetriesExceeded {
                id: record.id.clone(),
                attempts: record.retry_count,
                last_error: record.last_error.clone().unwrap_or_default(),
            };
            if self.discard_tx.send(record.clone()).is_err() {
                tracing::error!(id = %record.id, resource = %record.resource, "discarded record has no listener");
            }
            self.report_error(&err);
        }
    }

    fn spawn_flush(self: &Arc<Self>, trigger: Trigger) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let _ = shared.run_flush(trigger).await;
        });
    }

    /// Applies a connectivity change; an offline-to-online edge with a
    /// non-empty queue starts a flush.
    async fn on_network(self: &Arc<Self>, state: NetworkState) {
        let online = state.is_online();
        let was_online = self.online.swap(online, Ordering::SeqCst);
        self.status_tx.send_modify(|s| s.is_online = online);

        if online == was_online {
            return;
        }
        tracing::info!(online, "connectivity changed");
        if !online {
            return;
        }
        match self.refresh_size().await {
            Ok(0) => {}
            Ok(_) => self.spawn_flush(Trigger::Connectivity),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read queue size");
                self.report_error(&e);
            }
        }
    }
}

/// Builder for a running coordinator.
pub struct Coordinator {
    store: QueueStore,
    executor: Arc<dyn RemoteExecutor>,
    connectivity: Arc<dyn ConnectivityObserver>,
    lifecycle: Option<Arc<dyn LifecycleObserver>>,
    config: CoordinatorConfig,
    on_flush: Option<FlushCallback>,
    on_error: Option<ErrorCallback>,
}

impl Coordinator {
    pub fn new(
        store: QueueStore,
        executor: Arc<dyn RemoteExecutor>,
        connectivity: Arc<dyn ConnectivityObserver>,
    ) -> Self {
        Self {
            store,
            executor,
            connectivity,
            lifecycle: None,
            config: CoordinatorConfig::default(),
            on_flush: None,
            on_error: None,
        }
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn on_flush(mut self, cb: impl Fn(&FlushResult) + Send + Sync + 'static) -> Self {
        self.on_flush = Some(Arc::new(cb));
        self
    }

    pub fn on_error(mut self, cb: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(cb));
        self
    }

    /// Reads initial state, subscribes to sources and spawns the event loop.
    ///
    /// Must be called within a tokio runtime. If the device is already online
    /// with queued records, a flush starts immediately.
    pub async fn start(self) -> (CoordinatorHandle, DiscardFeed) {
        let initial = self.connectivity.fetch_current().await;
        let (status_tx, _) = watch::channel(SyncStatus {
            is_online: initial.is_online(),
            ..SyncStatus::default()
        });
        let (discard_tx, discard_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let shared = Arc::new(Shared {
            store: self.store,
            executor: self.executor,
            online: AtomicBool::new(initial.is_online()),
            flushing: AtomicBool::new(false),
            status_tx,
            discard_tx,
            on_flush: self.on_flush,
            on_error: self.on_error,
            cancel_token: cancel_token.clone(),
        });

        let initial_size = match shared.refresh_size().await {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read queue size");
                shared.report_error(&e);
                0
            }
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut subscriptions = Vec::with_capacity(2);
        let tx = event_tx.clone();
        subscriptions.push(self.connectivity.subscribe(Box::new(move |state| {
            let _ = tx.send(Event::Network(state));
        })));
        if let Some(lifecycle) = &self.lifecycle {
            let tx = event_tx;
            subscriptions.push(lifecycle.subscribe(Box::new(move |state| {
                let _ = tx.send(Event::App(state));
            })));
        }

        let task = tokio::spawn(event_loop(
            Arc::clone(&shared),
            event_rx,
            self.config.clone(),
            subscriptions,
            cancel_token.clone(),
        ));

        tracing::info!(
            online = initial.is_online(),
            queue_size = initial_size,
            interval_secs = self.config.flush_interval.as_secs(),
            "coordinator started"
        );
        if initial.is_online() && initial_size > 0 {
            shared.spawn_flush(Trigger::Start);
        }

        let handle = CoordinatorHandle {
            shared,
            cancel_token,
            task: Arc::new(Mutex::new(Some(task))),
        };
        (handle, DiscardFeed { rx: discard_rx })
    }
}

async fn event_loop(
    shared: Arc<Shared>,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    config: CoordinatorConfig,
    subscriptions: Vec<Subscription>,
    cancel_token: CancellationToken,
) {
    let mut interval = config.periodic_enabled().then(|| {
        let period = config.flush_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let mut events_open = true;
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            event = event_rx.recv(), if events_open => match event {
                Some(Event::Network(state)) => shared.on_network(state).await,
                Some(Event::App(AppState::Active)) => {
                    tracing::debug!("app returned to foreground");
                    shared.spawn_flush(Trigger::Foreground);
                }
                Some(Event::App(AppState::Background)) => {}
                None => {
                    tracing::debug!("event sources closed; timer only");
                    events_open = false;
                }
            },
            _ = tick(&mut interval) => shared.spawn_flush(Trigger::Timer),
        }
    }

    for sub in &subscriptions {
        sub.cancel();
    }
    tracing::debug!("coordinator stopped");
}

async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Handle to a running coordinator.
///
/// Cloning shares the same coordinator. The event loop stops on
/// [`CoordinatorHandle::shutdown`].
#[derive(Clone)]
pub struct CoordinatorHandle {
    shared: Arc<Shared>,
    cancel_token: CancellationToken,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CoordinatorHandle {
    pub fn status(&self) -> SyncStatus {
        self.shared.status_tx.borrow().clone()
    }

    pub fn phase(&self) -> SyncPhase {
        self.status().phase()
    }

    /// Returns a receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status_tx.subscribe()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online
    }

    pub fn queue_size(&self) -> usize {
        self.status().queue_size
    }

    pub fn last_flush_at(&self) -> Option<DateTime<Utc>> {
        self.status().last_flush_at
    }

    pub fn is_flushing(&self) -> bool {
        self.status().is_flushing
    }

    pub fn store(&self) -> &QueueStore {
        &self.shared.store
    }

    /// Runs a flush now, subject to the online and single-flight checks.
    pub async fn force_flush(&self) -> FlushOutcome {
        self.shared.run_flush(Trigger::Manual).await
    }

    /// Enqueues a mutation and refreshes the published queue size.
    ///
    /// Once the record is stored this returns its id. A failed size refresh
    /// after that goes to `on_error` and leaves the published size stale.
    pub async fn enqueue(&self, resource: impl Into<String>, operation: Operation) -> Result<String> {
        let id = self.shared.store.enqueue(resource, operation).await?;
        if let Err(e) = self.shared.refresh_size().await {
            tracing::warn!(%id, error = %e, "enqueued but failed to read queue size");
            self.shared.report_error(&e);
        }
        Ok(id)
    }

    /// Re-reads the queue size from storage.
    pub async fn refresh(&self) -> Result<usize> {
        self.shared.refresh_size().await
    }

    /// Stops the event loop and waits for it to exit.
    ///
    /// A flush already in flight runs to completion in its own task.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        let task = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl std::fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("status", &self.status())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
