// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outq-sync: decides when the offline queue is flushed.
//!
//! A [`Coordinator`] ties a [`outq_core::QueueStore`] to connectivity and
//! lifecycle sources. It flushes when the device comes back online, when
//! the app returns to the foreground, on a periodic timer, and on demand,
//! never running two flushes at once.

pub mod connectivity;
pub mod coordinator;
pub mod lifecycle;
pub mod subscription;

pub use connectivity::{ConnectivityObserver, ManualConnectivity, NetworkState, StateFuture};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorHandle, DiscardFeed, ErrorCallback, FlushCallback,
    FlushOutcome, SkipReason, SyncPhase, SyncStatus, Trigger, DEFAULT_FLUSH_INTERVAL,
};
pub use lifecycle::{AppState, LifecycleObserver, ManualLifecycle};
pub use subscription::{Listener, ListenerSet, Subscription};
