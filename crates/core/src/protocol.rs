// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between the client executor and outq-remote.
//!
//! The protocol is request/response:
//! - Client sends one `mutate` per record and waits for its `ack` or `rejected`
//! - Client may `ping` to check the link; the server answers `pong`

use serde::{Deserialize, Serialize};

use crate::record::{Filter, Payload};

/// The write a `mutate` message asks the server to perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RemoteAction {
    Insert { row: Payload },
    Update { row: Payload, filter: Filter },
    Delete { filter: Filter },
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Apply a write to a resource.
    Mutate {
        /// Client-chosen id echoed in the response.
        request_id: u64,
        resource: String,
        action: RemoteAction,
    },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The write was applied.
    Ack {
        request_id: u64,
        /// Rows inserted, updated or deleted.
        affected: usize,
    },

    /// The write was refused; the client should retry later.
    Rejected { request_id: u64, message: String },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error not tied to a request (e.g. unparsable frame).
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Mutate message.
    pub fn mutate(request_id: u64, resource: impl Into<String>, action: RemoteAction) -> Self {
        ClientMessage::Mutate {
            request_id,
            resource: resource.into(),
            action,
        }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(request_id: u64, affected: usize) -> Self {
        ServerMessage::Ack {
            request_id,
            affected,
        }
    }

    /// Creates a Rejected message.
    pub fn rejected(request_id: u64, message: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            request_id,
            message: message.into(),
        }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Returns the request id this message answers, if any.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Ack { request_id, .. } | ServerMessage::Rejected { request_id, .. } => {
                Some(*request_id)
            }
            ServerMessage::Pong { .. } | ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
