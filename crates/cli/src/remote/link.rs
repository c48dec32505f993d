// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request/reply link to an outq-remote server.
//!
//! A [`Socket`] only moves text frames. A [`Link`] owns one socket and runs
//! the mutate protocol over it: it connects lazily, tags each request with
//! a fresh id and reads until the reply carrying that id arrives. Any
//! failure or timeout drops the socket, so a late reply can never be
//! matched to a later request. The next request reconnects.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use outq_core::protocol::{ClientMessage, RemoteAction, ServerMessage};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("cannot reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("connect to {url} timed out after {ms}ms")]
    ConnectTimeout { url: String, ms: u128 },

    #[error("socket error: {0}")]
    Socket(String),

    #[error("connection closed before reply")]
    Closed,

    #[error("no response for request {request_id} within {ms}ms")]
    ReplyTimeout { request_id: u64, ms: u128 },

    /// The server could not process the frame at all.
    #[error("server error: {0}")]
    Server(String),

    #[error("malformed frame: {0}")]
    Malformed(String),
}

pub type SocketFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LinkError>> + Send + 'a>>;

/// Raw text-frame socket.
pub trait Socket: Send {
    fn open(&mut self, url: &str) -> SocketFuture<'_, ()>;

    fn write(&mut self, frame: String) -> SocketFuture<'_, ()>;

    /// Next text frame, or `None` once the peer has closed.
    fn read(&mut self) -> SocketFuture<'_, Option<String>>;

    fn shutdown(&mut self) -> SocketFuture<'_, ()>;
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// [`Socket`] over tokio-tungstenite.
#[derive(Default)]
pub struct WsSocket {
    ws: Option<WsStream>,
}

impl WsSocket {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> Result<&mut WsStream, LinkError> {
        self.ws.as_mut().ok_or(LinkError::Closed)
    }
}

impl Socket for WsSocket {
    fn open(&mut self, url: &str) -> SocketFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| LinkError::Unreachable {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;
            self.ws = Some(ws);
            tracing::debug!(%url, "connected");
            Ok(())
        })
    }

    fn write(&mut self, frame: String) -> SocketFuture<'_, ()> {
        Box::pin(async move {
            self.stream()?
                .send(Message::Text(frame.into()))
                .await
                .map_err(|e| LinkError::Socket(e.to_string()))
        })
    }

    fn read(&mut self) -> SocketFuture<'_, Option<String>> {
        Box::pin(async move {
            let ws = self.stream()?;
            while let Some(frame) = ws.next().await {
                match frame.map_err(|e| LinkError::Socket(e.to_string()))? {
                    Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                    Message::Close(_) => return Ok(None),
                    _ => {}
                }
            }
            Ok(None)
        })
    }

    fn shutdown(&mut self) -> SocketFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                let _ = ws.close(None).await;
            }
            Ok(())
        })
    }
}

/// How the server answered a mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Applied { affected: usize },
    Refused(String),
}

/// One request at a time over a lazily opened socket.
pub struct Link<S: Socket = WsSocket> {
    url: String,
    timeout: Duration,
    socket: S,
    open: bool,
    next_request_id: u64,
}

impl Link<WsSocket> {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_socket(url, WsSocket::new(), timeout)
    }
}

impl<S: Socket> Link<S> {
    pub fn with_socket(url: impl Into<String>, socket: S, timeout: Duration) -> Self {
        Link {
            url: url.into(),
            timeout,
            socket,
            open: false,
            next_request_id: 1,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Sends one mutate and waits for its reply.
    ///
    /// A refusal is a reply, not an error, and keeps the socket open.
    pub async fn request(
        &mut self,
        resource: &str,
        action: RemoteAction,
    ) -> Result<Reply, LinkError> {
        if !self.open {
            self.connect().await?;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let result = self.exchange(request_id, resource, action).await;
        if let Err(e) = &result {
            if !matches!(e, LinkError::Server(_)) {
                tracing::debug!(request_id, error = %e, "dropping connection");
                self.close().await;
            }
        }
        result
    }

    /// Shuts the socket down if it is open.
    pub async fn close(&mut self) {
        if self.open {
            let _ = self.socket.shutdown().await;
            self.open = false;
        }
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        let limit = self.timeout;
        match tokio::time::timeout(limit, self.socket.open(&self.url)).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = self.socket.shutdown().await;
                return Err(LinkError::ConnectTimeout {
                    url: self.url.clone(),
                    ms: limit.as_millis(),
                });
            }
        }
        self.open = true;
        Ok(())
    }

    async fn exchange(
        &mut self,
        request_id: u64,
        resource: &str,
        action: RemoteAction,
    ) -> Result<Reply, LinkError> {
        let frame = ClientMessage::mutate(request_id, resource, action)
            .to_json()
            .map_err(|e| LinkError::Malformed(e.to_string()))?;
        self.socket.write(frame).await?;

        let limit = self.timeout;
        tokio::time::timeout(limit, self.await_reply(request_id))
            .await
            .unwrap_or_else(|_| {
                Err(LinkError::ReplyTimeout {
                    request_id,
                    ms: limit.as_millis(),
                })
            })
    }

    async fn await_reply(&mut self, request_id: u64) -> Result<Reply, LinkError> {
        loop {
            let frame = self.socket.read().await?.ok_or(LinkError::Closed)?;
            let msg =
                ServerMessage::from_json(&frame).map_err(|e| LinkError::Malformed(e.to_string()))?;
            match msg {
                ServerMessage::Ack {
                    request_id: id,
                    affected,
                } if id == request_id => return Ok(Reply::Applied { affected }),
                ServerMessage::Rejected {
                    request_id: id,
                    message,
                } if id == request_id => return Ok(Reply::Refused(message)),
                ServerMessage::Error { message } => return Err(LinkError::Server(message)),
                other => tracing::debug!(?other, request_id, "ignoring unrelated message"),
            }
        }
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
pub(crate) mod tests;
