// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record id generation.
//!
//! Format: `{created_at_ms}-{suffix}` where suffix is the first 8 hex chars of
//! SHA256 over the timestamp, process id, a process-wide counter and the
//! sub-millisecond clock reading. The millisecond prefix keeps ids roughly
//! sortable by creation time; the suffix separates records created in the
//! same millisecond.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a record id for the given creation time.
pub fn generate_id(created_at: &DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let entropy = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let input = format!(
        "{}:{}:{}:{}",
        created_at.timestamp_millis(),
        std::process::id(),
        seq,
        entropy
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{}-{}", created_at.timestamp_millis(), hex::encode(&hash[..4]))
}

/// Generate an id that does not collide with any existing one.
///
/// Regenerates until `exists` returns false.
pub fn generate_unique_id<F>(created_at: &DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let id = generate_id(created_at);
        if !exists(&id) {
            return id;
        }
    }
}

/// Returns the creation time in milliseconds encoded in an id, if any.
pub fn id_millis(id: &str) -> Option<i64> {
    id.split_once('-').and_then(|(ms, _)| ms.parse().ok())
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
