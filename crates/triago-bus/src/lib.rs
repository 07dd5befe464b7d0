// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process change-notification bus.
//!
//! Every committed state transition is published here so observer UIs can
//! follow along (`ticket_created`, `ticket_status_changed`,
//! `conversation_updated`, `note_added`). The bus is a bounded broadcast
//! channel: lagging subscribers lose the oldest events, and publishing
//! never fails the operation that produced the event.

use tokio::sync::broadcast;
use tracing::trace;

use triago_core::Event;

/// Broadcast bus carrying committed state-change notifications.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A send error only means there are no subscribers right now, which
    /// is normal at startup; the event is dropped silently.
    pub fn publish(&self, event: Event) {
        match self.tx.send(event) {
            Ok(receivers) => trace!(receivers, "event published"),
            Err(_) => trace!("event dropped: no subscribers"),
        }
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
