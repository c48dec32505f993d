// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote execution abstraction.
//!
//! A [`RemoteExecutor`] performs one insert, update or delete against a named
//! remote resource. Implementations own transport concerns (connections,
//! timeouts, auth); the flush engine only sees success or an [`AdapterError`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::record::{Filter, Payload};

/// Failure reported by a remote executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AdapterError {
    pub message: String,
}

impl AdapterError {
    pub fn new(message: impl Into<String>) -> Self {
        AdapterError {
            message: message.into(),
        }
    }
}

/// Result type for remote executor calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Boxed future returned by remote executor calls.
pub type AdapterFuture<'a> = Pin<Box<dyn Future<Output = AdapterResult<()>> + Send + 'a>>;

/// Executes writes against a remote resource API.
pub trait RemoteExecutor: Send + Sync {
    /// Insert `row` into `resource`.
    fn insert<'a>(&'a self, resource: &'a str, row: &'a Payload) -> AdapterFuture<'a>;

    /// Update rows of `resource` matching `filter` with the fields in `row`.
    fn update<'a>(
        &'a self,
        resource: &'a str,
        row: &'a Payload,
        filter: &'a Filter,
    ) -> AdapterFuture<'a>;

    /// Delete rows of `resource` matching `filter`.
    fn delete<'a>(&'a self, resource: &'a str, filter: &'a Filter) -> AdapterFuture<'a>;
}

impl<T: RemoteExecutor + ?Sized> RemoteExecutor for Arc<T> {
    fn insert<'a>(&'a self, resource: &'a str, row: &'a Payload) -> AdapterFuture<'a> {
        (**self).insert(resource, row)
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        row: &'a Payload,
        filter: &'a Filter,
    ) -> AdapterFuture<'a> {
        (**self).update(resource, row, filter)
    }

    fn delete<'a>(&'a self, resource: &'a str, filter: &'a Filter) -> AdapterFuture<'a> {
        (**self).delete(resource, filter)
    }
}

impl<T: RemoteExecutor + ?Sized> RemoteExecutor for &T {
    fn insert<'a>(&'a self, resource: &'a str, row: &'a Payload) -> AdapterFuture<'a> {
        (**self).insert(resource, row)
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        row: &'a Payload,
        filter: &'a Filter,
    ) -> AdapterFuture<'a> {
        (**self).update(resource, row, filter)
    }

    fn delete<'a>(&'a self, resource: &'a str, filter: &'a Filter) -> AdapterFuture<'a> {
        (**self).delete(resource, filter)
    }
}
