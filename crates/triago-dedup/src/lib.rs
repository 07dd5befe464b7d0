// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-TTL cache of externally-assigned message identifiers.
//!
//! The upstream channel delivers at-least-once, so the same external
//! message id can arrive more than once within the provider's retry
//! window. [`DedupCache::seen`] absorbs those redeliveries. Entries expire
//! after a fixed TTL; a false negative after expiry is acceptable because
//! the retry window is bounded, while a false positive within the TTL must
//! never happen (the identifier space is assumed collision-free over the
//! window).
//!
//! This is an injected, in-process store. A multi-worker deployment would
//! swap it for a shared cache behind the same call shape; that boundary is
//! out of scope here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// How many `seen` calls pass between opportunistic purges of expired
/// entries. Keeps the map bounded without a background task.
const PURGE_EVERY: u64 = 1024;

/// Concurrent TTL set of external message ids.
pub struct DedupCache {
    ttl: Duration,
    entries: DashMap<String, Instant>,
    calls: AtomicU64,
}

impl DedupCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
            calls: AtomicU64::new(0),
        }
    }

    /// Check-and-record an external message id.
    ///
    /// Returns `true` if the id was recorded within the TTL window (the
    /// caller must silently discard the message). Returns `false` and
    /// records the id otherwise. Expired entries are treated as absent and
    /// re-recorded.
    pub fn seen(&self, id: &str) -> bool {
        self.maybe_purge();

        let now = Instant::now();
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if now.duration_since(*occupied.get()) < self.ttl {
                    debug!(external_id = id, "duplicate delivery absorbed");
                    true
                } else {
                    // Expired: treat as new and restart the window.
                    occupied.insert(now);
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                false
            }
        }
    }

    /// Number of currently tracked ids, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries every [`PURGE_EVERY`] calls.
    fn maybe_purge(&self) {
        let count = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PURGE_EVERY != 0 {
            return;
        }
        let ttl = self.ttl;
        let now = Instant::now();
        self.entries
            .retain(|_, recorded| now.duration_since(*recorded) < ttl);
    }
}
