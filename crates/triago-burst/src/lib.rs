// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender debounce queue merging message bursts into single turns.
//!
//! Customers often send several short messages in quick succession. The
//! aggregator buffers them per sender and dispatches one combined [`Turn`]
//! once the sender has been silent for the debounce window. Every new
//! message supersedes the sender's pending timer, so a turn is never
//! dispatched mid-burst.
//!
//! The flush takes the whole pending queue out of the map in one step
//! (swap-and-clear) before anything downstream is awaited: a message
//! landing mid-flush starts a fresh queue with a fresh timer instead of
//! being appended to a list already being consumed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use triago_core::{InboundMessage, Turn};

/// Separator between burst items in the combined turn text. Preserves the
/// message boundaries for the downstream consumer.
const ITEM_SEPARATOR: &str = "\n\n";

struct SenderQueue {
    items: Vec<InboundMessage>,
    /// Bumped on every enqueue; a debounce timer only dispatches if its
    /// generation still matches, so newer messages supersede older timers.
    generation: u64,
}

/// Debounce queue handing combined turns to an mpsc consumer.
pub struct BurstAggregator {
    debounce: Duration,
    queues: Arc<Mutex<HashMap<String, SenderQueue>>>,
    dispatch_tx: mpsc::Sender<Turn>,
}

impl BurstAggregator {
    /// Create an aggregator with the given debounce window.
    ///
    /// Returns the aggregator and the receiving end of the dispatch
    /// channel; the consumer drives turns into the router.
    pub fn new(debounce: Duration) -> (Self, mpsc::Receiver<Turn>) {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(256);
        (
            Self {
                debounce,
                queues: Arc::new(Mutex::new(HashMap::new())),
                dispatch_tx,
            },
            dispatch_rx,
        )
    }

    /// Buffer a message and (re)start the sender's debounce timer.
    pub async fn enqueue(&self, msg: InboundMessage) {
        let sender_id = msg.sender_id.clone();
        let generation = {
            let mut queues = self.queues.lock().await;
            let queue = queues.entry(sender_id.clone()).or_insert(SenderQueue {
                items: Vec::new(),
                generation: 0,
            });
            queue.items.push(msg);
            queue.generation += 1;
            queue.generation
        };

        debug!(sender_id = %sender_id, generation, "message buffered");

        let queues = Arc::clone(&self.queues);
        let tx = self.dispatch_tx.clone();
        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Swap-and-clear: take ownership of the queue in one step, before
            // any downstream await. A superseded timer finds a newer
            // generation and does nothing.
            let taken = {
                let mut queues = queues.lock().await;
                match queues.get(&sender_id) {
                    Some(queue) if queue.generation == generation => queues.remove(&sender_id),
                    _ => None,
                }
            };

            if let Some(queue) = taken
                && tx.send(combine(&sender_id, queue.items)).await.is_err()
            {
                warn!(sender_id = %sender_id, "turn dropped: dispatch receiver closed");
            }
        });
    }

    /// Dispatch every pending queue immediately.
    ///
    /// Used on shutdown so buffered turns are not lost. Pending timers
    /// find their sender gone and become no-ops.
    pub async fn flush_all(&self) {
        let drained = {
            let mut queues = self.queues.lock().await;
            std::mem::take(&mut *queues)
        };
        for (sender_id, queue) in drained {
            debug!(sender_id = %sender_id, items = queue.items.len(), "flushing on demand");
            if self
                .dispatch_tx
                .send(combine(&sender_id, queue.items))
                .await
                .is_err()
            {
                warn!(sender_id = %sender_id, "turn dropped: dispatch receiver closed");
            }
        }
    }

    /// Number of senders with buffered messages.
    pub async fn pending_senders(&self) -> usize {
        self.queues.lock().await.len()
    }
}

/// Merge buffered items into one turn, in arrival order.
fn combine(sender_id: &str, items: Vec<InboundMessage>) -> Turn {
    let channel = items
        .first()
        .map(|m| m.channel.clone())
        .unwrap_or_default();
    let started_at = items
        .first()
        .map(|m| m.timestamp.clone())
        .unwrap_or_default();
    let text = items
        .iter()
        .map(|m| m.content.to_text())
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR);
    Turn {
        sender_id: sender_id.to_string(),
        channel,
        text,
        message_count: items.len(),
        started_at,
    }
}
