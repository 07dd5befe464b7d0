// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket lifecycle service.
//!
//! Owns ticket creation (allow-list validation + sequence-backed id
//! issuance), guarded status transitions with their append-only audit
//! trail, the bounded reopen rules, and notes.

use std::sync::Arc;

use tracing::{debug, info};

use triago_bus::EventBus;
use triago_config::model::TicketConfig;
use triago_core::types::now_rfc3339;
use triago_core::{
    Actor, Event, Note, Resolution, StatusChange, StorageAdapter, Ticket, TicketStatus,
    TriagoError,
};

use crate::hooks::TransitionHook;
use crate::ticket;

/// Input for ticket creation, from the assistant tool-call path or a
/// manual operator action.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub customer_id: String,
    pub conversation_id: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
}

/// Service applying guarded transitions to tickets.
pub struct TicketService {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    bus: EventBus,
    hooks: Vec<Arc<dyn TransitionHook>>,
    config: TicketConfig,
}

impl TicketService {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        bus: EventBus,
        config: TicketConfig,
    ) -> Self {
        Self {
            storage,
            bus,
            hooks: Vec::new(),
            config,
        }
    }

    /// Register a transition hook, invoked after each committed transition.
    pub fn with_hook(mut self, hook: Arc<dyn TransitionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The current generation period (calendar year).
    pub fn current_period() -> String {
        chrono::Utc::now().format("%Y").to_string()
    }

    fn compose_id(&self, period: &str, sequence: i64) -> String {
        let sep = &self.config.separator;
        format!(
            "{}{sep}{period}{sep}{:0width$}",
            self.config.prefix,
            sequence,
            width = self.config.sequence_width
        )
    }

    /// Create a ticket with a freshly issued id.
    ///
    /// The id is issued first; if the insert fails afterwards no ticket
    /// exists and the sequence value is simply skipped, so a ticket is
    /// never created without a successfully issued id.
    pub async fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, TriagoError> {
        if !self.config.categories.contains(&request.category) {
            return Err(TriagoError::InvalidField {
                field: "category",
                value: request.category,
                allowed: self.config.categories.join(", "),
            });
        }
        if !self.config.priorities.contains(&request.priority) {
            return Err(TriagoError::InvalidField {
                field: "priority",
                value: request.priority,
                allowed: self.config.priorities.join(", "),
            });
        }

        let period = Self::current_period();
        let sequence = self.storage.next_sequence(&period).await?;
        let id = self.compose_id(&period, sequence);

        let now = now_rfc3339();
        let ticket = Ticket {
            id,
            conversation_id: request.conversation_id,
            customer_id: request.customer_id,
            subject: request.subject,
            description: request.description,
            status: TicketStatus::New,
            priority: request.priority,
            category: request.category,
            resolution: None,
            reopen_count: 0,
            last_reopened_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.insert_ticket(&ticket).await?;

        info!(
            ticket_id = %ticket.id,
            customer_id = %ticket.customer_id,
            category = %ticket.category,
            priority = %ticket.priority,
            "ticket created"
        );
        self.bus.publish(Event::TicketCreated {
            ticket: ticket.clone(),
        });
        Ok(ticket)
    }

    /// Apply a guarded status change.
    ///
    /// Transitions along a reopen edge (`resolved|closed -> open`) are
    /// routed through the bounded-reopen rules; an elevated actor counts
    /// as a manual reopen.
    pub async fn transition(
        &self,
        id: &str,
        to: TicketStatus,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<Ticket, TriagoError> {
        let mut ticket = self.load(id).await?;
        let previous = ticket.status;
        ticket::check_transition(previous, to)?;

        if ticket::is_reopen_edge(previous, to) {
            return self
                .apply_reopen(
                    ticket,
                    actor,
                    reason.unwrap_or("reopened"),
                    actor.is_elevated(),
                )
                .await;
        }

        let now = now_rfc3339();
        if to == TicketStatus::Resolved {
            // Set exactly once per resolve action; cleared again on reopen.
            ticket.resolution = Some(Resolution {
                summary: reason.unwrap_or("resolved").to_string(),
                resolved_by: actor.to_string(),
                resolved_at: now.clone(),
            });
        }
        ticket.status = to;
        ticket.updated_at = now.clone();

        self.commit(ticket, previous, actor, reason, now).await
    }

    /// Reopen a resolved or closed ticket.
    ///
    /// Legal iff the status is `resolved` or `closed`, the reopen count is
    /// below the configured maximum, and -- for the automatic path -- the
    /// resolution is still within the auto-reopen window. Violations are
    /// reported business errors that leave the ticket unchanged.
    pub async fn reopen(
        &self,
        id: &str,
        actor: &Actor,
        reason: &str,
        manual: bool,
    ) -> Result<Ticket, TriagoError> {
        let ticket = self.load(id).await?;
        if !matches!(ticket.status, TicketStatus::Resolved | TicketStatus::Closed) {
            return Err(TriagoError::ReopenNotAllowed {
                entity: "ticket",
                id: ticket.id,
                reason: format!("status {} cannot be reopened", ticket.status),
            });
        }
        self.apply_reopen(ticket, actor, reason, manual).await
    }

    /// Attach a note to a ticket.
    pub async fn add_note(
        &self,
        ticket_id: &str,
        author: &Actor,
        body: &str,
        internal: bool,
    ) -> Result<Note, TriagoError> {
        // Existence check keeps notes from dangling.
        self.load(ticket_id).await?;

        let mut note = Note {
            id: 0,
            ticket_id: ticket_id.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            internal,
            created_at: now_rfc3339(),
        };
        note.id = self.storage.add_note(&note).await?;
        debug!(ticket_id, note_id = note.id, internal, "note added");
        self.bus.publish(Event::NoteAdded {
            ticket_id: ticket_id.to_string(),
            note: note.clone(),
        });
        Ok(note)
    }

    async fn load(&self, id: &str) -> Result<Ticket, TriagoError> {
        self.storage
            .get_ticket(id)
            .await?
            .ok_or_else(|| TriagoError::NotFound {
                entity: "ticket",
                id: id.to_string(),
            })
    }

    async fn apply_reopen(
        &self,
        mut ticket: Ticket,
        actor: &Actor,
        reason: &str,
        manual: bool,
    ) -> Result<Ticket, TriagoError> {
        let previous = ticket.status;

        if ticket.reopen_count >= self.config.max_reopen_count {
            return Err(TriagoError::ReopenNotAllowed {
                entity: "ticket",
                id: ticket.id,
                reason: format!(
                    "reopen limit of {} reached",
                    self.config.max_reopen_count
                ),
            });
        }
        if !manual && !self.within_auto_reopen_window(&ticket) {
            return Err(TriagoError::ReopenNotAllowed {
                entity: "ticket",
                id: ticket.id,
                reason: format!(
                    "auto-reopen window of {}h elapsed",
                    self.config.auto_reopen_window_hours
                ),
            });
        }

        let now = now_rfc3339();
        ticket.status = TicketStatus::Open;
        ticket.resolution = None;
        ticket.reopen_count += 1;
        ticket.last_reopened_at = Some(now.clone());
        ticket.updated_at = now.clone();

        self.commit(ticket, previous, actor, Some(reason), now).await
    }

    /// Persist the new row and its history entry atomically, then notify.
    async fn commit(
        &self,
        ticket: Ticket,
        previous: TicketStatus,
        actor: &Actor,
        reason: Option<&str>,
        changed_at: String,
    ) -> Result<Ticket, TriagoError> {
        let change = StatusChange {
            ticket_id: ticket.id.clone(),
            previous,
            next: ticket.status,
            changed_by: actor.to_string(),
            changed_at,
            reason: reason.map(str::to_string),
        };
        self.storage
            .update_ticket_with_history(&ticket, &change)
            .await?;

        info!(
            ticket_id = %ticket.id,
            from = %previous,
            to = %ticket.status,
            actor = %actor,
            reason = reason.unwrap_or(""),
            "ticket transition"
        );

        self.bus.publish(Event::TicketStatusChanged {
            ticket: ticket.clone(),
            previous,
        });
        for hook in &self.hooks {
            hook.on_ticket_transition(&ticket, previous).await;
        }
        Ok(ticket)
    }

    fn within_auto_reopen_window(&self, ticket: &Ticket) -> bool {
        let Some(resolution) = &ticket.resolution else {
            // No recorded resolution (e.g. closed without one): the
            // automatic path has nothing to measure against.
            return false;
        };
        let Ok(resolved_at) = chrono::DateTime::parse_from_rfc3339(&resolution.resolved_at)
        else {
            return false;
        };
        let window = chrono::TimeDelta::hours(self.config.auto_reopen_window_hours as i64);
        chrono::Utc::now().signed_duration_since(resolved_at) <= window
    }
}
