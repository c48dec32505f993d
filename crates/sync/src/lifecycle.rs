// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host application lifecycle (foreground/background) events.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::subscription::{Listener, ListenerSet, Subscription};

/// Whether the host application is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Active,
    Background,
}

/// Source of application state transitions.
pub trait LifecycleObserver: Send + Sync {
    fn subscribe(&self, listener: Listener<AppState>) -> Subscription;
}

impl<T: LifecycleObserver + ?Sized> LifecycleObserver for Arc<T> {
    fn subscribe(&self, listener: Listener<AppState>) -> Subscription {
        (**self).subscribe(listener)
    }
}

/// Lifecycle source driven by explicit calls.
#[derive(Default)]
pub struct ManualLifecycle {
    state: Mutex<AppState>,
    listeners: ListenerSet<AppState>,
}

impl ManualLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AppState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    /// Records `next` and notifies listeners.
    ///
    /// Listeners see every call, including a repeated `Active`, since hosts
    /// report resume events even when no background transition was observed.
    pub fn set(&self, next: AppState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
        self.listeners.emit(&next);
    }

    pub fn foreground(&self) {
        self.set(AppState::Active);
    }

    pub fn background(&self) {
        self.set(AppState::Background);
    }
}

impl LifecycleObserver for ManualLifecycle {
    fn subscribe(&self, listener: Listener<AppState>) -> Subscription {
        self.listeners.add(listener)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
