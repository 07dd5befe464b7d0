// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle service.
//!
//! All conversation status changes -- operator actions, router decisions,
//! and the reconciliation sweep alike -- go through [`ConversationService::transition`],
//! which validates against the adjacency table, applies the per-state side
//! effects, persists the row, and publishes the change notification.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use triago_bus::EventBus;
use triago_core::types::now_rfc3339;
use triago_core::{
    Actor, ChannelAdapter, Conversation, ConversationStatus, Event, OutboundMessage,
    StorageAdapter, TriagoError,
};

use crate::conversation;
use crate::hooks::TransitionHook;

/// Outbound confirmation prompt sent to the customer on entering `resolved`.
pub struct ResolutionPrompt {
    pub channel: Arc<dyn ChannelAdapter + Send + Sync>,
    pub text: String,
}

/// Service applying guarded transitions to conversations.
pub struct ConversationService {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    bus: EventBus,
    hooks: Vec<Arc<dyn TransitionHook>>,
    prompt: Option<ResolutionPrompt>,
}

impl ConversationService {
    pub fn new(storage: Arc<dyn StorageAdapter + Send + Sync>, bus: EventBus) -> Self {
        Self {
            storage,
            bus,
            hooks: Vec::new(),
            prompt: None,
        }
    }

    /// Register a transition hook, invoked after each committed transition.
    pub fn with_hook(mut self, hook: Arc<dyn TransitionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Enable the resolution confirmation prompt.
    pub fn with_resolution_prompt(
        mut self,
        channel: Arc<dyn ChannelAdapter + Send + Sync>,
        text: String,
    ) -> Self {
        self.prompt = Some(ResolutionPrompt { channel, text });
        self
    }

    /// The current conversation for a customer, creating a fresh `open` one
    /// on first contact.
    pub async fn ensure_conversation(
        &self,
        customer_id: &str,
        channel: &str,
    ) -> Result<Conversation, TriagoError> {
        if let Some(conversation) = self
            .storage
            .latest_conversation_for_customer(customer_id)
            .await?
        {
            return Ok(conversation);
        }

        let now = now_rfc3339();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            channel: channel.to_string(),
            status: ConversationStatus::Open,
            assigned_operator: None,
            assistant_enabled: true,
            last_message_at: None,
            last_customer_message_at: None,
            last_agent_message_at: None,
            resolved_at: None,
            resolved_by: None,
            closed_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.insert_conversation(&conversation).await?;
        info!(
            conversation_id = %conversation.id,
            customer_id,
            channel,
            "conversation created"
        );
        Ok(conversation)
    }

    /// Apply a guarded status change.
    ///
    /// Entering `assigned` through this entry point takes the operator id
    /// from the acting operator; use [`assign`](Self::assign) to hand a
    /// conversation to a specific operator on their behalf.
    pub async fn transition(
        &self,
        id: &str,
        to: ConversationStatus,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<Conversation, TriagoError> {
        let operator = actor.operator_id().map(str::to_string);
        self.apply(id, to, actor, operator, reason).await
    }

    /// Assign a conversation to a named operator (handoff trigger, manual
    /// dispatch).
    pub async fn assign(
        &self,
        id: &str,
        operator_id: &str,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<Conversation, TriagoError> {
        self.apply(
            id,
            ConversationStatus::Assigned,
            actor,
            Some(operator_id.to_string()),
            reason,
        )
        .await
    }

    /// Release an operator-held conversation back to the assistant.
    pub async fn release(
        &self,
        id: &str,
        actor: &Actor,
        reason: &str,
    ) -> Result<Conversation, TriagoError> {
        self.transition(id, ConversationStatus::Open, actor, Some(reason))
            .await
    }

    async fn apply(
        &self,
        id: &str,
        to: ConversationStatus,
        actor: &Actor,
        operator: Option<String>,
        reason: Option<&str>,
    ) -> Result<Conversation, TriagoError> {
        let mut conversation =
            self.storage
                .get_conversation(id)
                .await?
                .ok_or_else(|| TriagoError::NotFound {
                    entity: "conversation",
                    id: id.to_string(),
                })?;
        let previous = conversation.status;

        let forced = match conversation::check_transition(previous, to) {
            Ok(()) => false,
            // Elevated roles may force-close from any non-terminal state.
            Err(_)
                if to == ConversationStatus::Closed
                    && previous != ConversationStatus::Closed
                    && actor.is_elevated() =>
            {
                true
            }
            Err(e) => return Err(e),
        };

        // The reopen edge is restricted: elevated roles, or the customer's
        // own activity (auto-reopen).
        if previous == ConversationStatus::Closed
            && to == ConversationStatus::Open
            && !actor.is_elevated()
            && !matches!(actor, Actor::Customer(_))
        {
            return Err(TriagoError::ReopenNotAllowed {
                entity: "conversation",
                id: id.to_string(),
                reason: "closed conversations reopen only via elevated roles or customer activity"
                    .to_string(),
            });
        }

        let now = now_rfc3339();
        conversation.status = to;
        match to {
            ConversationStatus::Open => {
                conversation.assigned_operator = None;
                conversation.assistant_enabled = true;
                conversation.resolved_at = None;
                conversation.resolved_by = None;
                conversation.closed_at = None;
            }
            ConversationStatus::Assigned => {
                let operator = operator.ok_or_else(|| {
                    TriagoError::Internal(
                        "entering assigned requires an operator id".to_string(),
                    )
                })?;
                conversation.assigned_operator = Some(operator);
                conversation.assistant_enabled = false;
            }
            ConversationStatus::Waiting => {
                // Operator carries over from assigned; the guard ensures it.
            }
            ConversationStatus::Resolved => {
                conversation.assigned_operator = None;
                conversation.assistant_enabled = true;
                conversation.resolved_at = Some(now.clone());
                conversation.resolved_by = Some(actor.to_string());
            }
            ConversationStatus::Closed => {
                conversation.assigned_operator = None;
                conversation.closed_at = Some(now.clone());
            }
        }
        conversation.updated_at = now;

        self.storage.update_conversation(&conversation).await?;

        info!(
            conversation_id = %conversation.id,
            from = %previous,
            to = %to,
            actor = %actor,
            reason = reason.unwrap_or(""),
            forced,
            "conversation transition"
        );

        self.bus.publish(Event::ConversationUpdated {
            conversation: conversation.clone(),
            previous,
        });
        for hook in &self.hooks {
            hook.on_conversation_transition(&conversation, previous).await;
        }

        if to == ConversationStatus::Resolved {
            self.send_resolution_prompt(&conversation).await;
        }

        Ok(conversation)
    }

    /// Stamp customer activity timestamps.
    pub async fn record_customer_message(&self, id: &str) -> Result<Conversation, TriagoError> {
        self.touch(id, true).await
    }

    /// Stamp operator/assistant activity timestamps.
    pub async fn record_agent_message(&self, id: &str) -> Result<Conversation, TriagoError> {
        self.touch(id, false).await
    }

    async fn touch(&self, id: &str, customer: bool) -> Result<Conversation, TriagoError> {
        let mut conversation =
            self.storage
                .get_conversation(id)
                .await?
                .ok_or_else(|| TriagoError::NotFound {
                    entity: "conversation",
                    id: id.to_string(),
                })?;
        let now = now_rfc3339();
        conversation.last_message_at = Some(now.clone());
        if customer {
            conversation.last_customer_message_at = Some(now.clone());
        } else {
            conversation.last_agent_message_at = Some(now.clone());
        }
        conversation.updated_at = now;
        self.storage.update_conversation(&conversation).await?;
        Ok(conversation)
    }

    /// Fire the confirmation prompt; delivery failures are logged, never
    /// propagated (the transition has already committed).
    async fn send_resolution_prompt(&self, conversation: &Conversation) {
        let Some(prompt) = &self.prompt else {
            return;
        };
        let msg = OutboundMessage {
            recipient_id: conversation.customer_id.clone(),
            channel: conversation.channel.clone(),
            text: prompt.text.clone(),
        };
        if let Err(e) = prompt.channel.send(msg).await {
            warn!(
                conversation_id = %conversation.id,
                error = %e,
                "failed to send resolution confirmation prompt"
            );
        }
    }
}
