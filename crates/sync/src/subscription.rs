// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription handles for observer-style event sources.
//!
//! Sources keep their listeners in a [`ListenerSet`]. Subscribing returns a
//! [`Subscription`]; cancelling it (or dropping it) stops delivery. Cancelled
//! listeners are pruned on the next emit.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// Callback invoked with each new value from a source.
pub type Listener<T> = Box<dyn Fn(T) + Send + Sync>;

/// Handle to an active subscription.
///
/// Delivery stops when the handle is cancelled or dropped.
#[derive(Debug)]
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    /// Wraps a cancellation token owned by the source.
    pub fn new(token: CancellationToken) -> Self {
        Subscription { token }
    }

    /// Stops delivery.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Registry of listeners for one event source.
pub struct ListenerSet<T> {
    entries: Mutex<Vec<(CancellationToken, Listener<T>)>>,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        ListenerSet {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn add(&self, listener: Listener<T>) -> Subscription {
        let token = CancellationToken::new();
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((token.clone(), listener));
        }
        Subscription::new(token)
    }

    /// Delivers `value` to every live listener.
    ///
    /// Listeners run under the registry lock and must not subscribe or emit
    /// on the same set.
    pub fn emit(&self, value: &T) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(token, _)| !token.is_cancelled());
            for (_, listener) in entries.iter() {
                listener(value.clone());
            }
        }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.iter().filter(|(t, _)| !t.is_cancelled()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
