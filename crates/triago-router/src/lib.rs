// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment router: assistant or human operator, decided per turn.
//!
//! The deciding read happens fresh from storage immediately before the
//! branch, never from a cached copy. An operator claiming a conversation
//! while a burst is still buffering therefore wins: the turn lands in
//! their queue and no assistant reply is generated alongside theirs.

pub mod handoff;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use triago_config::model::RoutingConfig;
use triago_core::{
    Actor, AssistantAdapter, ChannelAdapter, Conversation, ConversationStatus,
    OutboundMessage, StorageAdapter, TicketStatus, TriagoError, Turn,
};
use triago_lifecycle::{ConversationService, TicketService};

/// Where a turn ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The assistant replied.
    Assistant,
    /// The turn was forwarded to a human operator.
    Operator { operator: String },
    /// Assistant attempts were exhausted; the fallback message was sent.
    Fallback,
}

/// Routes combined turns based on fresh conversation state.
pub struct AssignmentRouter {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    conversations: Arc<ConversationService>,
    tickets: Arc<TicketService>,
    assistant: Arc<dyn AssistantAdapter + Send + Sync>,
    customer_channel: Arc<dyn ChannelAdapter + Send + Sync>,
    operator_channel: Arc<dyn ChannelAdapter + Send + Sync>,
    config: RoutingConfig,
}

impl AssignmentRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        conversations: Arc<ConversationService>,
        tickets: Arc<TicketService>,
        assistant: Arc<dyn AssistantAdapter + Send + Sync>,
        customer_channel: Arc<dyn ChannelAdapter + Send + Sync>,
        operator_channel: Arc<dyn ChannelAdapter + Send + Sync>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            storage,
            conversations,
            tickets,
            assistant,
            customer_channel,
            operator_channel,
            config,
        }
    }

    /// Route one combined turn.
    pub async fn route_turn(&self, turn: &Turn) -> Result<RouteOutcome, TriagoError> {
        let conversation = self
            .conversations
            .ensure_conversation(&turn.sender_id, &turn.channel)
            .await?;
        let customer = Actor::Customer(turn.sender_id.clone());

        // Customer activity pulls terminal-adjacent conversations back to
        // open before any routing decision is made.
        let conversation = match conversation.status {
            ConversationStatus::Closed => {
                self.conversations
                    .transition(
                        &conversation.id,
                        ConversationStatus::Open,
                        &customer,
                        Some("customer_reopen"),
                    )
                    .await?
            }
            ConversationStatus::Resolved => {
                self.conversations
                    .transition(
                        &conversation.id,
                        ConversationStatus::Open,
                        &customer,
                        Some("customer_followup"),
                    )
                    .await?
            }
            _ => conversation,
        };

        self.conversations
            .record_customer_message(&conversation.id)
            .await?;
        self.maybe_reopen_linked_ticket(&conversation, &turn.sender_id)
            .await?;

        // An explicit request for a person claims the conversation for the
        // default operator before the normal branch.
        if conversation.assigned_operator.is_none()
            && handoff::matches_handoff(&turn.text, &self.config.handoff_triggers)
        {
            let assigned = self
                .conversations
                .assign(
                    &conversation.id,
                    &self.config.default_operator,
                    &Actor::System,
                    Some("handoff_trigger"),
                )
                .await?;
            info!(
                conversation_id = %assigned.id,
                operator = %self.config.default_operator,
                "handoff trigger matched"
            );
            self.forward_to_operator(&assigned, turn).await;
            return Ok(RouteOutcome::Operator {
                operator: self.config.default_operator.clone(),
            });
        }

        // Re-read before deciding: the stored row, not the copy we've been
        // carrying through this function.
        let fresh = self
            .storage
            .get_conversation(&conversation.id)
            .await?
            .ok_or_else(|| TriagoError::NotFound {
                entity: "conversation",
                id: conversation.id.clone(),
            })?;

        if matches!(
            fresh.status,
            ConversationStatus::Assigned | ConversationStatus::Waiting
        ) && let Some(operator) = fresh.assigned_operator.clone()
        {
            self.forward_to_operator(&fresh, turn).await;
            return Ok(RouteOutcome::Operator { operator });
        }

        self.assistant_path(&fresh, turn).await
    }

    /// Auto-reopen the linked ticket when a recently resolved one gets a
    /// customer follow-up. Window/count violations are expected outcomes,
    /// not failures.
    async fn maybe_reopen_linked_ticket(
        &self,
        conversation: &Conversation,
        sender_id: &str,
    ) -> Result<(), TriagoError> {
        let Some(ticket) = self
            .storage
            .ticket_for_conversation(&conversation.id)
            .await?
        else {
            return Ok(());
        };
        if ticket.status != TicketStatus::Resolved {
            return Ok(());
        }

        match self
            .tickets
            .reopen(
                &ticket.id,
                &Actor::Customer(sender_id.to_string()),
                "customer_followup",
                false,
            )
            .await
        {
            Ok(reopened) => {
                info!(
                    ticket_id = %reopened.id,
                    reopen_count = reopened.reopen_count,
                    "ticket auto-reopened on customer follow-up"
                );
                Ok(())
            }
            Err(TriagoError::ReopenNotAllowed { reason, .. }) => {
                debug!(ticket_id = %ticket.id, reason, "ticket not auto-reopened");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Forward a turn into the operator channel. Delivery is
    /// fire-and-forget: failures are logged, the routing decision stands.
    async fn forward_to_operator(&self, conversation: &Conversation, turn: &Turn) {
        let Some(operator) = conversation.assigned_operator.clone() else {
            warn!(conversation_id = %conversation.id, "no operator to forward to");
            return;
        };
        let msg = OutboundMessage {
            recipient_id: operator.clone(),
            channel: turn.channel.clone(),
            text: format!("[{}] {}", turn.sender_id, turn.text),
        };
        if let Err(e) = self.operator_channel.send(msg).await {
            warn!(
                conversation_id = %conversation.id,
                operator = %operator,
                error = %e,
                "operator forward failed"
            );
        }
    }

    /// Call the assistant with bounded retry and exponential backoff; send
    /// the fallback message once attempts are exhausted.
    async fn assistant_path(
        &self,
        conversation: &Conversation,
        turn: &Turn,
    ) -> Result<RouteOutcome, TriagoError> {
        let max_attempts = self.config.max_assistant_attempts.max(1);
        let cap = Duration::from_millis(self.config.retry_max_ms);
        let mut delay = Duration::from_millis(self.config.retry_base_ms);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self
                .assistant
                .reply(&turn.text, &turn.sender_id, &conversation.id)
                .await
            {
                Ok(reply) => {
                    self.send_to_customer(conversation, reply).await;
                    self.conversations
                        .record_agent_message(&conversation.id)
                        .await?;
                    return Ok(RouteOutcome::Assistant);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        conversation_id = %conversation.id,
                        attempt,
                        error = %e,
                        backoff_ms = delay.as_millis() as u64,
                        "assistant call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(cap);
                }
                Err(e) => {
                    error!(
                        conversation_id = %conversation.id,
                        attempts = attempt,
                        error = %e,
                        "assistant path exhausted, sending fallback"
                    );
                    self.send_to_customer(conversation, self.config.fallback_message.clone())
                        .await;
                    return Ok(RouteOutcome::Fallback);
                }
            }
        }
    }

    async fn send_to_customer(&self, conversation: &Conversation, text: String) {
        let msg = OutboundMessage {
            recipient_id: conversation.customer_id.clone(),
            channel: conversation.channel.clone(),
            text,
        };
        if let Err(e) = self.customer_channel.send(msg).await {
            warn!(
                conversation_id = %conversation.id,
                error = %e,
                "customer send failed"
            );
        }
    }
}
