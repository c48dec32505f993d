// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! [`RemoteExecutor`] over a request/response WebSocket link.
//!
//! Each write is one `mutate` message. The executor holds the [`Link`] for
//! the whole exchange, so records are applied strictly one at a time.

use std::time::Duration;

use outq_core::protocol::RemoteAction;
use outq_core::{AdapterError, AdapterFuture, AdapterResult, Filter, Payload, RemoteExecutor};
use tokio::sync::Mutex;

use super::link::{Link, Reply, Socket, WsSocket};

pub struct WebSocketExecutor<S: Socket = WsSocket> {
    url: String,
    link: Mutex<Link<S>>,
}

impl WebSocketExecutor<WsSocket> {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::from_link(Link::new(url, timeout))
    }
}

impl<S: Socket> WebSocketExecutor<S> {
    pub fn from_link(link: Link<S>) -> Self {
        WebSocketExecutor {
            url: link.url().to_string(),
            link: Mutex::new(link),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Closes the connection if one is open.
    pub async fn close(&self) {
        self.link.lock().await.close().await;
    }

    async fn request(&self, resource: &str, action: RemoteAction) -> AdapterResult<()> {
        let reply = self.link.lock().await.request(resource, action).await;
        match reply {
            Ok(Reply::Applied { affected }) => {
                tracing::debug!(resource, affected, "mutation acknowledged");
                Ok(())
            }
            Ok(Reply::Refused(message)) => Err(AdapterError::new(message)),
            Err(e) => Err(AdapterError::new(e.to_string())),
        }
    }
}

impl<S: Socket> RemoteExecutor for WebSocketExecutor<S> {
    fn insert<'a>(&'a self, resource: &'a str, row: &'a Payload) -> AdapterFuture<'a> {
        Box::pin(self.request(resource, RemoteAction::Insert { row: row.clone() }))
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        row: &'a Payload,
        filter: &'a Filter,
    ) -> AdapterFuture<'a> {
        Box::pin(self.request(
            resource,
            RemoteAction::Update {
                row: row.clone(),
                filter: filter.clone(),
            },
        ))
    }

    fn delete<'a>(&'a self, resource: &'a str, filter: &'a Filter) -> AdapterFuture<'a> {
        Box::pin(self.request(
            resource,
            RemoteAction::Delete {
                filter: filter.clone(),
            },
        ))
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
