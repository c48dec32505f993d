// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles shared by the workspace crates.
//!
//! Enabled by the `testing` feature (and always inside this crate's tests).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::adapter::{AdapterError, AdapterFuture, AdapterResult, RemoteExecutor};
use crate::record::{Filter, OperationKind, Payload};

/// One call observed by a [`ScriptedExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorCall {
    pub kind: OperationKind,
    pub resource: String,
    pub row: Option<Payload>,
    pub filter: Option<Filter>,
}

/// Remote executor whose outcomes are scripted up front.
///
/// Each call pops the next scripted outcome; once the script is empty the
/// fallback outcome applies. Every call is recorded.
#[derive(Clone)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<VecDeque<AdapterResult<()>>>>,
    fallback: Arc<Mutex<AdapterResult<()>>>,
    calls: Arc<Mutex<Vec<ExecutorCall>>>,
}

impl ScriptedExecutor {
    /// An executor that succeeds unless scripted otherwise.
    pub fn succeeding() -> Self {
        Self::with_fallback(Ok(()))
    }

    /// An executor that fails with `message` unless scripted otherwise.
    pub fn failing(message: &str) -> Self {
        Self::with_fallback(Err(AdapterError::new(message)))
    }

    fn with_fallback(fallback: AdapterResult<()>) -> Self {
        ScriptedExecutor {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(fallback)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues an outcome for the next unscripted call.
    pub fn then(self, outcome: AdapterResult<()>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
        self
    }

    /// Queues a success.
    pub fn then_ok(self) -> Self {
        self.then(Ok(()))
    }

    /// Queues a failure.
    pub fn then_err(self, message: &str) -> Self {
        self.then(Err(AdapterError::new(message)))
    }

    /// Replaces the outcome used once the script runs dry.
    pub fn set_fallback(&self, outcome: AdapterResult<()>) {
        if let Ok(mut fallback) = self.fallback.lock() {
            *fallback = outcome;
        }
    }

    /// Returns every call seen so far.
    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the number of calls seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn next(&self, call: ExecutorCall) -> AdapterResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match scripted {
            Some(outcome) => outcome,
            None => self
                .fallback
                .lock()
                .map(|f| f.clone())
                .unwrap_or_else(|_| Err(AdapterError::new("executor lock poisoned"))),
        }
    }
}

impl RemoteExecutor for ScriptedExecutor {
    fn insert<'a>(&'a self, resource: &'a str, row: &'a Payload) -> AdapterFuture<'a> {
        let outcome = self.next(ExecutorCall {
            kind: OperationKind::Insert,
            resource: resource.to_string(),
            row: Some(row.clone()),
            filter: None,
        });
        Box::pin(async move { outcome })
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        row: &'a Payload,
        filter: &'a Filter,
    ) -> AdapterFuture<'a> {
        let outcome = self.next(ExecutorCall {
            kind: OperationKind::Update,
            resource: resource.to_string(),
            row: Some(row.clone()),
            filter: Some(filter.clone()),
        });
        Box::pin(async move { outcome })
    }

    fn delete<'a>(&'a self, resource: &'a str, filter: &'a Filter) -> AdapterFuture<'a> {
        let outcome = self.next(ExecutorCall {
            kind: OperationKind::Delete,
            resource: resource.to_string(),
            row: None,
            filter: Some(filter.clone()),
        });
        Box::pin(async move { outcome })
    }
}

/// Builds a payload from a JSON object literal. Non-objects yield an empty map.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
