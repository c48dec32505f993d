// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting(counter: &Arc<AtomicUsize>) -> Listener<u32> {
    let counter = Arc::clone(counter);
    Box::new(move |n| {
        counter.fetch_add(n as usize, Ordering::SeqCst);
    })
}

#[test]
fn emit_reaches_every_listener() {
    let set = ListenerSet::new();
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));
    let _sa = set.add(counting(&a));
    let _sb = set.add(counting(&b));

    set.emit(&2);

    assert_eq!(a.load(Ordering::SeqCst), 2);
    assert_eq!(b.load(Ordering::SeqCst), 2);
    assert_eq!(set.len(), 2);
}

#[test]
fn cancelled_subscription_stops_delivery() {
    let set = ListenerSet::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let sub = set.add(counting(&hits));

    set.emit(&1);
    sub.cancel();
    assert!(sub.is_cancelled());
    set.emit(&1);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(set.is_empty());
}

#[test]
fn dropping_subscription_cancels() {
    let set = ListenerSet::new();
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let _sub = set.add(counting(&hits));
    }
    set.emit(&5);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
