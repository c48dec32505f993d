// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the outq-remote server binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper to spawn a server process and clean it up on drop.
struct ServerProcess {
    child: Child,
    port: u16,
}

impl ServerProcess {
    fn spawn(port_offset: u16, reject: &[&str]) -> Self {
        // High ephemeral range, spread by pid so parallel runs rarely collide
        let port = 49152 + (std::process::id() % 1000) as u16 * 2 + port_offset;

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_outq-remote"));
        cmd.arg("--bind").arg(format!("127.0.0.1:{}", port));
        for resource in reject {
            cmd.arg("--reject").arg(resource);
        }
        let child = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server process");

        ServerProcess { child, port }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Connects, retrying while the process starts up.
    async fn connect(&self) -> (SplitSink<Ws, Message>, SplitStream<Ws>) {
        for _ in 0..20 {
            if let Ok(Ok((stream, _))) =
                tokio::time::timeout(Duration::from_millis(500), connect_async(&self.ws_url()))
                    .await
            {
                return stream.split();
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        panic!("should connect to server within retries");
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

async fn request(
    sink: &mut SplitSink<Ws, Message>,
    stream: &mut SplitStream<Ws>,
    msg: serde_json::Value,
) -> serde_json::Value {
    sink.send(Message::Text(msg.to_string().into()))
        .await
        .expect("send request");

    match tokio::time::timeout(Duration::from_secs(5), stream.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => serde_json::from_str(&text).unwrap(),
        other => panic!("Expected text reply, got {:?}", other),
    }
}

#[tokio::test]
async fn server_answers_ping() {
    let server = ServerProcess::spawn(0, &[]);
    let (mut sink, mut stream) = server.connect().await;

    let reply = request(
        &mut sink,
        &mut stream,
        serde_json::json!({"type": "ping", "id": 12345}),
    )
    .await;

    assert_eq!(reply, serde_json::json!({"type": "pong", "id": 12345}));
}

#[tokio::test]
async fn server_applies_writes_and_rejects_configured_resources() {
    let server = ServerProcess::spawn(1, &["audit"]);
    let (mut sink, mut stream) = server.connect().await;

    let insert = request(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "mutate",
            "request_id": 1,
            "resource": "orders",
            "action": {"op": "insert", "row": {"id": 1, "status": "new"}}
        }),
    )
    .await;
    assert_eq!(
        insert,
        serde_json::json!({"type": "ack", "request_id": 1, "affected": 1})
    );

    let update = request(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "mutate",
            "request_id": 2,
            "resource": "orders",
            "action": {
                "op": "update",
                "row": {"status": "paid"},
                "filter": {"column": "id", "value": 1}
            }
        }),
    )
    .await;
    assert_eq!(update["affected"], 1);

    let rejected = request(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "mutate",
            "request_id": 3,
            "resource": "audit",
            "action": {"op": "delete", "filter": {"column": "id", "value": 1}}
        }),
    )
    .await;
    assert_eq!(rejected["type"], "rejected");
    assert_eq!(rejected["request_id"], 3);
}
