// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote execution over WebSocket.
//!
//! - [`Link`] runs the request/reply protocol over a [`Socket`]
//! - [`WebSocketExecutor`] implements [`outq_core::RemoteExecutor`] on top of it

mod executor;
mod link;

pub use executor::WebSocketExecutor;
pub use link::{Link, LinkError, Reply, Socket, SocketFuture, WsSocket};
