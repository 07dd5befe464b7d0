// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic reconciliation sweep.
//!
//! Applies the time-based transitions a user action would otherwise
//! perform: releasing assigned conversations that went idle, and closing
//! resolved conversations whose confirmation window lapsed. Every action
//! goes through the same guarded service entry points as operator
//! actions -- the sweep never mutates status directly.
//!
//! The customer-follow-up ticket reopen is applied by the router at
//! message-arrival time, when its precondition becomes observable; the
//! sweep owns only the purely clock-driven transitions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use triago_config::model::SweepConfig;
use triago_core::{Actor, Conversation, ConversationStatus, StorageAdapter, TriagoError};
use triago_lifecycle::ConversationService;

/// What one sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Assigned conversations released back to the assistant.
    pub released: usize,
    /// Resolved conversations closed after the confirmation timeout.
    pub closed: usize,
}

/// Fixed-interval background reconciliation.
pub struct ReconciliationSweep {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    conversations: Arc<ConversationService>,
    config: SweepConfig,
}

impl ReconciliationSweep {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        conversations: Arc<ConversationService>,
        config: SweepConfig,
    ) -> Self {
        Self {
            storage,
            conversations,
            config,
        }
    }

    /// Run sweep passes on the configured interval until cancelled.
    ///
    /// Pass failures are logged and the loop continues; a broken pass must
    /// not stop future reconciliation.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(interval_secs = self.config.interval_secs, "reconciliation sweep running");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sweep_once().await {
                        Ok(stats) if stats != SweepStats::default() => {
                            info!(
                                released = stats.released,
                                closed = stats.closed,
                                "sweep pass applied transitions"
                            );
                        }
                        Ok(_) => debug!("sweep pass: nothing to do"),
                        Err(e) => error!(error = %e, "sweep pass failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("reconciliation sweep stopped");
                    break;
                }
            }
        }
    }

    /// One reconciliation pass.
    pub async fn sweep_once(&self) -> Result<SweepStats, TriagoError> {
        let mut stats = SweepStats::default();
        stats.released = self.release_stale_assignments().await?;
        stats.closed = self.close_unconfirmed_resolutions().await?;
        Ok(stats)
    }

    /// `assigned` conversations with no activity past the threshold go
    /// back to `open`, exactly as an operator release would.
    async fn release_stale_assignments(&self) -> Result<usize, TriagoError> {
        let threshold = chrono::TimeDelta::minutes(self.config.inactivity_release_minutes as i64);
        let now = chrono::Utc::now();
        let mut released = 0;

        for conversation in self
            .storage
            .list_conversations_by_status(ConversationStatus::Assigned)
            .await?
        {
            let Some(last_activity) = parse_last_activity(&conversation) else {
                warn!(
                    conversation_id = %conversation.id,
                    "skipping conversation with unparseable activity timestamp"
                );
                continue;
            };
            if now.signed_duration_since(last_activity) <= threshold {
                continue;
            }
            match self
                .conversations
                .release(&conversation.id, &Actor::System, "auto_timeout_inactivity")
                .await
            {
                Ok(_) => {
                    info!(
                        conversation_id = %conversation.id,
                        operator = conversation.assigned_operator.as_deref().unwrap_or(""),
                        "stale assignment released"
                    );
                    released += 1;
                }
                Err(e) => {
                    // One stuck conversation must not block the rest.
                    warn!(conversation_id = %conversation.id, error = %e, "release failed");
                }
            }
        }
        Ok(released)
    }

    /// `resolved` conversations past the confirmation timeout are closed.
    async fn close_unconfirmed_resolutions(&self) -> Result<usize, TriagoError> {
        let timeout = chrono::TimeDelta::hours(self.config.resolution_close_hours as i64);
        let now = chrono::Utc::now();
        let mut closed = 0;

        for conversation in self
            .storage
            .list_conversations_by_status(ConversationStatus::Resolved)
            .await?
        {
            let Some(resolved_at) = conversation
                .resolved_at
                .as_deref()
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            else {
                warn!(
                    conversation_id = %conversation.id,
                    "skipping resolved conversation without parseable resolved_at"
                );
                continue;
            };
            if now.signed_duration_since(resolved_at) <= timeout {
                continue;
            }
            match self
                .conversations
                .transition(
                    &conversation.id,
                    ConversationStatus::Closed,
                    &Actor::System,
                    Some("auto_close_resolution_timeout"),
                )
                .await
            {
                Ok(_) => {
                    info!(conversation_id = %conversation.id, "unconfirmed resolution closed");
                    closed += 1;
                }
                Err(e) => {
                    warn!(conversation_id = %conversation.id, error = %e, "close failed");
                }
            }
        }
        Ok(closed)
    }
}

/// Most recent activity on a conversation, falling back to `updated_at`.
fn parse_last_activity(
    conversation: &Conversation,
) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    conversation
        .last_message_at
        .as_deref()
        .or(Some(conversation.updated_at.as_str()))
        .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
}
