// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::remote::link::tests::MockSocket;
use outq_core::protocol::{ClientMessage, ServerMessage};
use outq_core::testing::payload;
use outq_core::{MemoryStorage, Operation, QueueStore};
use serde_json::json;
use std::sync::Arc;

const URL: &str = "ws://localhost:7890";

fn executor(socket: MockSocket) -> WebSocketExecutor<MockSocket> {
    WebSocketExecutor::from_link(Link::with_socket(URL, socket, Duration::from_secs(2)))
}

#[tokio::test]
async fn insert_sends_mutate_and_waits_for_ack() {
    let socket = MockSocket::acking();
    let exec = executor(socket.clone());

    exec.insert("orders", &payload(json!({"id": "o1"})))
        .await
        .unwrap();

    assert_eq!(exec.url(), URL);
    assert_eq!(
        socket.sent(),
        vec![ClientMessage::mutate(
            1,
            "orders",
            RemoteAction::Insert {
                row: payload(json!({"id": "o1"}))
            }
        )]
    );
}

#[tokio::test]
async fn update_and_delete_carry_filters() {
    let socket = MockSocket::acking();
    let exec = executor(socket.clone());

    let row = payload(json!({"qty": 2}));
    exec.update("orders", &row, &Filter::eq("id", "o1"))
        .await
        .unwrap();
    exec.delete("orders", &Filter::eq("id", "o1")).await.unwrap();

    let sent = socket.sent();
    assert!(matches!(
        &sent[0],
        ClientMessage::Mutate { action: RemoteAction::Update { filter, .. }, .. }
            if *filter == Filter::eq("id", "o1")
    ));
    assert!(matches!(
        &sent[1],
        ClientMessage::Mutate { action: RemoteAction::Delete { .. }, .. }
    ));
}

#[tokio::test]
async fn refusal_becomes_adapter_error() {
    let exec = executor(MockSocket::rejecting("row locked"));

    let err = exec
        .insert("orders", &payload(json!({"id": "o1"})))
        .await
        .unwrap_err();
    assert_eq!(err.message, "row locked");
}

#[tokio::test]
async fn link_failures_become_adapter_errors() {
    let socket = MockSocket::new();
    socket.push_reply(ServerMessage::error("bad frame"));
    let exec = executor(socket);

    let err = exec
        .delete("orders", &Filter::eq("id", 1))
        .await
        .unwrap_err();
    assert_eq!(err.message, "server error: bad frame");

    let err = exec
        .delete("orders", &Filter::eq("id", 1))
        .await
        .unwrap_err();
    assert_eq!(err.message, "connection closed before reply");
}

#[tokio::test]
async fn unreachable_remote_is_retried_next_call() {
    let socket = MockSocket::acking();
    socket.set_fail_open(true);
    let exec = executor(socket.clone());

    let err = exec
        .insert("orders", &payload(json!({"id": "o1"})))
        .await
        .unwrap_err();
    assert!(err.message.contains("cannot reach"));

    socket.set_fail_open(false);
    exec.insert("orders", &payload(json!({"id": "o1"})))
        .await
        .unwrap();
    assert_eq!(socket.open_count(), 2);
}

#[tokio::test]
async fn close_shuts_the_socket() {
    let socket = MockSocket::acking();
    let exec = executor(socket.clone());
    exec.insert("orders", &payload(json!({"id": "o1"})))
        .await
        .unwrap();

    exec.close().await;
    assert!(!socket.is_open());
}

#[tokio::test]
async fn flush_through_websocket_executor() {
    let storage = Arc::new(MemoryStorage::new());
    let queue = QueueStore::open("exec-test", storage).unwrap();
    queue
        .enqueue("orders", Operation::insert(payload(json!({"id": "o1"}))))
        .await
        .unwrap();
    queue
        .enqueue("orders", Operation::delete("id", Some(json!("o0"))))
        .await
        .unwrap();

    let socket = MockSocket::acking();
    let exec = executor(socket.clone());
    let result = queue.flush(&exec).await.unwrap();

    assert_eq!(result.flushed, 2);
    assert_eq!(result.remaining, 0);
    assert_eq!(socket.sent_ids(), vec![1, 2]);
}
