// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test server utilities and server tests.
//!
//! Provides a TestServer that runs on a random port so client behavior can be
//! exercised against the real connection handler.

#![cfg(test)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::server;
use crate::state::ServerState;

/// A test server that runs on a random port and can be controlled.
pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    state: ServerState,
}

impl TestServer {
    /// Start a new test server on a random available port.
    pub async fn start(rejected: &[&str]) -> Self {
        let state = ServerState::new(rejected.iter().map(|r| r.to_string()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let state_clone = state.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = accept_loop(listener, state_clone) => {
                    if let Err(e) = result {
                        eprintln!("Test server error: {}", e);
                    }
                }
                _ = shutdown_rx => {}
            }
        });

        TestServer {
            addr,
            shutdown_tx,
            state,
        }
    }

    /// Get the WebSocket URL for connecting to this server.
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get access to the server state for verification.
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Shutdown the test server.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn accept_loop(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            let _ = server::handle_connection(stream, peer_addr, state).await;
        });
    }
}

mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use outq_core::protocol::{ClientMessage, RemoteAction, ServerMessage};
    use outq_core::{Filter, Payload};
    use serde_json::json;
    use tokio::time::{timeout, Duration};
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    fn row(value: serde_json::Value) -> Payload {
        value.as_object().unwrap().clone()
    }

    async fn mutate(state: &ServerState, resource: &str, action: RemoteAction) -> ServerMessage {
        let text = ClientMessage::mutate(7, resource, action).to_json().unwrap();
        server::handle_client_message(&text, state).await
    }

    #[tokio::test]
    async fn insert_acks_and_stores_row() {
        let state = ServerState::default();
        let reply = mutate(
            &state,
            "orders",
            RemoteAction::Insert {
                row: row(json!({"id": 1, "total": 10})),
            },
        )
        .await;

        assert_eq!(reply, ServerMessage::ack(7, 1));
        assert_eq!(state.rows("orders").await, vec![row(json!({"id": 1, "total": 10}))]);
    }

    #[tokio::test]
    async fn update_merges_into_matching_rows() {
        let state = ServerState::default();
        for id in [1, 2] {
            state
                .apply(
                    "orders",
                    RemoteAction::Insert {
                        row: row(json!({"id": id, "status": "new"})),
                    },
                )
                .await
                .unwrap();
        }

        let reply = mutate(
            &state,
            "orders",
            RemoteAction::Update {
                row: row(json!({"status": "paid"})),
                filter: Filter::eq("id", 2),
            },
        )
        .await;

        assert_eq!(reply, ServerMessage::ack(7, 1));
        let rows = state.rows("orders").await;
        assert_eq!(rows[0]["status"], "new");
        assert_eq!(rows[1], row(json!({"id": 2, "status": "paid"})));
    }

    #[tokio::test]
    async fn delete_removes_matching_rows() {
        let state = ServerState::default();
        for id in [1, 2, 1] {
            state
                .apply(
                    "orders",
                    RemoteAction::Insert {
                        row: row(json!({"id": id})),
                    },
                )
                .await
                .unwrap();
        }

        let reply = mutate(
            &state,
            "orders",
            RemoteAction::Delete {
                filter: Filter::eq("id", 1),
            },
        )
        .await;

        assert_eq!(reply, ServerMessage::ack(7, 2));
        assert_eq!(state.rows("orders").await, vec![row(json!({"id": 2}))]);
    }

    #[tokio::test]
    async fn write_matching_nothing_acks_zero() {
        let state = ServerState::default();
        let reply = mutate(
            &state,
            "orders",
            RemoteAction::Delete {
                filter: Filter::eq("id", 99),
            },
        )
        .await;
        assert_eq!(reply, ServerMessage::ack(7, 0));
    }

    #[tokio::test]
    async fn rejected_resource_refuses_writes() {
        let state = ServerState::new(["audit".to_string()]);
        let reply = mutate(
            &state,
            "audit",
            RemoteAction::Insert {
                row: row(json!({"id": 1})),
            },
        )
        .await;

        match reply {
            ServerMessage::Rejected {
                request_id,
                message,
            } => {
                assert_eq!(request_id, 7);
                assert!(message.contains("audit"));
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
        assert!(state.rows("audit").await.is_empty());
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let state = ServerState::default();
        let text = ClientMessage::ping(42).to_json().unwrap();
        let reply = server::handle_client_message(&text, &state).await;
        assert_eq!(reply, ServerMessage::pong(42));
    }

    #[yare::parameterized(
        not_json = { "not valid json" },
        unknown_type = { r#"{"type":"subscribe"}"# },
        missing_action = { r#"{"type":"mutate","request_id":1,"resource":"orders"}"# },
    )]
    #[test_macro(tokio::test)]
    async fn malformed_frame_returns_error(text: &str) {
        let state = ServerState::default();
        let reply = server::handle_client_message(text, &state).await;
        assert!(matches!(reply, ServerMessage::Error { .. }), "got {:?}", reply);
    }

    #[tokio::test]
    async fn mutate_over_websocket() {
        let server = TestServer::start(&[]).await;

        let (ws_stream, _) = connect_async(&server.ws_url()).await.unwrap();
        let (mut sink, mut stream) = ws_stream.split();

        let msg = ClientMessage::mutate(
            3,
            "orders",
            RemoteAction::Insert {
                row: row(json!({"id": 1})),
            },
        );
        sink.send(Message::Text(msg.to_json().unwrap().into()))
            .await
            .unwrap();

        let result = timeout(Duration::from_secs(5), stream.next()).await;
        match result {
            Ok(Some(Ok(Message::Text(text)))) => {
                let response = ServerMessage::from_json(&text).unwrap();
                assert_eq!(response, ServerMessage::ack(3, 1));
            }
            Ok(other) => panic!("Expected ack, got {:?}", other),
            Err(_) => panic!("Timeout waiting for ack"),
        }
        assert_eq!(server.state().rows("orders").await.len(), 1);

        server.shutdown();
    }

    #[tokio::test]
    async fn websocket_ping_frame() {
        let server = TestServer::start(&[]).await;

        let (ws_stream, _) = connect_async(&server.ws_url()).await.unwrap();
        let (mut sink, mut stream) = ws_stream.split();

        sink.send(Message::Ping(vec![1, 2, 3].into())).await.unwrap();

        let result = timeout(Duration::from_secs(5), stream.next()).await;
        match result {
            Ok(Some(Ok(Message::Pong(data)))) => {
                assert_eq!(data.as_ref(), &[1, 2, 3]);
            }
            Ok(other) => panic!("Expected Pong frame, got {:?}", other),
            Err(_) => panic!("Timeout waiting for Pong frame"),
        }

        server.shutdown();
    }

    #[tokio::test]
    async fn client_close_frame_ends_connection() {
        let server = TestServer::start(&[]).await;

        let (ws_stream, _) = connect_async(&server.ws_url()).await.unwrap();
        let (mut sink, mut stream) = ws_stream.split();

        sink.send(Message::Close(None)).await.unwrap();

        // A close echo, a clean end, or a reset are all acceptable
        let result = timeout(Duration::from_secs(5), stream.next()).await;
        match result {
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) | Ok(Some(Err(_))) => {}
            Ok(other) => panic!("Expected close or end, got {:?}", other),
            Err(_) => panic!("Timeout waiting for close"),
        }

        server.shutdown();
    }
}
