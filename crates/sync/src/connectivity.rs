// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability as seen by the sync coordinator.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::subscription::{Listener, ListenerSet, Subscription};

/// A snapshot of the device's network state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkState {
    /// Whether a network interface is up.
    pub is_connected: bool,
    /// Whether the wider internet answered; `None` while unknown.
    pub is_internet_reachable: Option<bool>,
}

impl NetworkState {
    pub fn online() -> Self {
        NetworkState {
            is_connected: true,
            is_internet_reachable: Some(true),
        }
    }

    pub fn offline() -> Self {
        NetworkState {
            is_connected: false,
            is_internet_reachable: Some(false),
        }
    }

    /// Connected, and reachability is not known to be false.
    pub fn is_online(&self) -> bool {
        self.is_connected && self.is_internet_reachable != Some(false)
    }
}

/// Future returned by [`ConnectivityObserver::fetch_current`].
pub type StateFuture<'a> = Pin<Box<dyn Future<Output = NetworkState> + Send + 'a>>;

/// Source of network state changes.
pub trait ConnectivityObserver: Send + Sync {
    /// Reads the current state.
    fn fetch_current(&self) -> StateFuture<'_>;

    /// Registers `listener` for subsequent changes.
    fn subscribe(&self, listener: Listener<NetworkState>) -> Subscription;
}

impl<T: ConnectivityObserver + ?Sized> ConnectivityObserver for Arc<T> {
    fn fetch_current(&self) -> StateFuture<'_> {
        (**self).fetch_current()
    }

    fn subscribe(&self, listener: Listener<NetworkState>) -> Subscription {
        (**self).subscribe(listener)
    }
}

/// Connectivity source driven by explicit calls.
///
/// Used by tests and by hosts that learn about the network out of band.
#[derive(Default)]
pub struct ManualConnectivity {
    state: Mutex<NetworkState>,
    listeners: ListenerSet<NetworkState>,
}

impl ManualConnectivity {
    pub fn new(initial: NetworkState) -> Self {
        ManualConnectivity {
            state: Mutex::new(initial),
            listeners: ListenerSet::new(),
        }
    }

    pub fn current(&self) -> NetworkState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    /// Records a new state and notifies listeners if it changed.
    pub fn set(&self, next: NetworkState) {
        let changed = match self.state.lock() {
            Ok(mut state) => {
                let changed = *state != next;
                *state = next;
                changed
            }
            Err(_) => false,
        };
        if changed {
            self.listeners.emit(&next);
        }
    }

    pub fn go_online(&self) {
        self.set(NetworkState::online());
    }

    pub fn go_offline(&self) {
        self.set(NetworkState::offline());
    }
}

impl ConnectivityObserver for ManualConnectivity {
    fn fetch_current(&self) -> StateFuture<'_> {
        let state = self.current();
        Box::pin(async move { state })
    }

    fn subscribe(&self, listener: Listener<NetworkState>) -> Subscription {
        self.listeners.add(listener)
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
