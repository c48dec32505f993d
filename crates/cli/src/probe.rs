// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity by TCP probe.
//!
//! A host process has no OS network callbacks to lean on, so `outq run`
//! treats "the remote accepts a TCP connection" as online. The probe polls
//! on an interval and notifies subscribers when the answer changes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use outq_sync::{ConnectivityObserver, Listener, ListenerSet, NetworkState, StateFuture, Subscription};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

pub struct TcpProbe {
    addr: String,
    timeout: Duration,
    state: Mutex<NetworkState>,
    listeners: ListenerSet<NetworkState>,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
            state: Mutex::new(NetworkState::offline()),
            listeners: ListenerSet::new(),
        }
    }

    /// Builds a probe for the host and port of a `ws://` or `wss://` URL.
    pub fn for_url(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::new(probe_addr(url)?, timeout))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Attempts one connection and returns the resulting state.
    pub async fn probe(&self) -> NetworkState {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => NetworkState::online(),
            Ok(Err(e)) => {
                tracing::trace!(addr = %self.addr, error = %e, "probe failed");
                NetworkState::offline()
            }
            Err(_) => NetworkState::offline(),
        }
    }

    /// Probes once and notifies subscribers if the state changed.
    pub async fn poll(&self) -> NetworkState {
        let next = self.probe().await;
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
        next
    }

    /// Polls every `interval` until `cancel` fires.
    pub fn spawn_polling(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let probe = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        probe.poll().await;
                    }
                }
            }
        })
    }
}

impl ConnectivityObserver for TcpProbe {
    fn fetch_current(&self) -> StateFuture<'_> {
        Box::pin(self.poll())
    }

    fn subscribe(&self, listener: Listener<NetworkState>) -> Subscription {
        self.listeners.add(listener)
    }
}

/// Resolves the `host:port` a WebSocket URL connects to.
pub fn probe_addr(url: &str) -> Result<String> {
    let uri: Uri = url
        .parse()
        .map_err(|_| Error::InvalidRemoteUrl(url.to_string()))?;
    let default_port = match uri.scheme_str() {
        Some("ws") => 80,
        Some("wss") => 443,
        _ => return Err(Error::InvalidRemoteUrl(url.to_string())),
    };
    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidRemoteUrl(url.to_string()))?;
    let port = uri.port_u16().unwrap_or(default_port);
    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
