// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline coordinator for the Triago routing core.
//!
//! The [`Engine`] is the central loop that:
//! - Receives inbound messages from the customer channel
//! - Drops at-least-once redeliveries via the dedup cache
//! - Buffers bursts per sender and consumes the combined turns
//! - Routes each turn to the assistant or the assigned operator
//! - Runs the reconciliation sweep in the background
//! - Flushes buffered bursts on graceful shutdown

pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use triago_burst::BurstAggregator;
use triago_bus::EventBus;
use triago_config::TriagoConfig;
use triago_core::{
    AssistantAdapter, ChannelAdapter, StorageAdapter, TriagoError, Turn,
};
use triago_dedup::DedupCache;
use triago_lifecycle::{ConversationService, TicketService};
use triago_router::AssignmentRouter;
use triago_sweep::ReconciliationSweep;

/// The assembled routing pipeline.
pub struct Engine {
    channel: Arc<dyn ChannelAdapter + Send + Sync>,
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    bus: EventBus,
    dedup: DedupCache,
    burst: BurstAggregator,
    /// Taken by `run`; the engine runs at most once.
    turns: Option<mpsc::Receiver<Turn>>,
    router: AssignmentRouter,
    sweep: Arc<ReconciliationSweep>,
    conversations: Arc<ConversationService>,
    tickets: Arc<TicketService>,
}

impl Engine {
    /// Assemble the pipeline from configuration and adapters.
    ///
    /// `customer_channel` carries both inbound customer messages and
    /// outbound replies; `operator_channel` receives forwarded turns.
    pub fn new(
        config: &TriagoConfig,
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        customer_channel: Arc<dyn ChannelAdapter + Send + Sync>,
        operator_channel: Arc<dyn ChannelAdapter + Send + Sync>,
        assistant: Arc<dyn AssistantAdapter + Send + Sync>,
    ) -> Self {
        let bus = EventBus::new(config.events.capacity);

        let mut conversations =
            ConversationService::new(storage.clone(), bus.clone());
        if config.routing.resolution_prompt_enabled {
            conversations = conversations.with_resolution_prompt(
                customer_channel.clone(),
                config.routing.resolution_prompt.clone(),
            );
        }
        let conversations = Arc::new(conversations);
        let tickets = Arc::new(TicketService::new(
            storage.clone(),
            bus.clone(),
            config.ticket.clone(),
        ));

        let dedup = DedupCache::new(Duration::from_secs(config.dedup.ttl_secs));
        let (burst, turns) =
            BurstAggregator::new(Duration::from_millis(config.burst.debounce_ms));

        let router = AssignmentRouter::new(
            storage.clone(),
            conversations.clone(),
            tickets.clone(),
            assistant,
            customer_channel.clone(),
            operator_channel,
            config.routing.clone(),
        );

        let sweep = Arc::new(ReconciliationSweep::new(
            storage.clone(),
            conversations.clone(),
            config.sweep.clone(),
        ));

        Self {
            channel: customer_channel,
            storage,
            bus,
            dedup,
            burst,
            turns: Some(turns),
            router,
            sweep,
            conversations,
            tickets,
        }
    }

    /// The change-notification bus, for observer UIs.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The conversation service, for operator-facing actions.
    pub fn conversations(&self) -> Arc<ConversationService> {
        self.conversations.clone()
    }

    /// The ticket service, for operator-facing actions.
    pub fn tickets(&self) -> Arc<TicketService> {
        self.tickets.clone()
    }

    /// Run the pipeline until the cancellation token fires.
    ///
    /// On shutdown, buffered bursts are flushed and their turns routed
    /// before storage is closed, so nothing buffered is lost.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), TriagoError> {
        let mut turns = self.turns.take().ok_or_else(|| {
            TriagoError::Internal("engine already running".to_string())
        })?;
        let channel = self.channel.clone();

        info!("engine running");

        let sweep_cancel = cancel.child_token();
        let sweep_task = {
            let sweep = Arc::clone(&self.sweep);
            let token = sweep_cancel.clone();
            tokio::spawn(async move { sweep.run(token).await })
        };

        loop {
            tokio::select! {
                msg = channel.receive() => {
                    match msg {
                        Ok(inbound) => {
                            if self.dedup.seen(&inbound.external_id) {
                                debug!(
                                    external_id = %inbound.external_id,
                                    "duplicate delivery dropped"
                                );
                                continue;
                            }
                            self.burst.enqueue(inbound).await;
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                turn = turns.recv() => {
                    match turn {
                        Some(turn) => self.route(turn).await,
                        // All senders dropped; nothing further can arrive.
                        None => break,
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping engine");
                    break;
                }
            }
        }

        // Flush buffered bursts and route what came out.
        self.burst.flush_all().await;
        while let Ok(turn) = turns.try_recv() {
            self.route(turn).await;
        }

        // Stop the sweep even when the loop ended without an external
        // cancellation (e.g. the channel closed).
        sweep_cancel.cancel();
        sweep_task.await.ok();
        self.storage.close().await?;

        info!("engine stopped");
        Ok(())
    }

    async fn route(&self, turn: Turn) {
        let sender_id = turn.sender_id.clone();
        match self.router.route_turn(&turn).await {
            Ok(outcome) => {
                debug!(sender_id = %sender_id, ?outcome, "turn routed");
            }
            Err(e) => {
                error!(sender_id = %sender_id, error = %e, "failed to route turn");
            }
        }
    }
}
