// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observer seam for committed transitions.
//!
//! The two lifecycles are deliberately not synchronized with each other.
//! A deployment that wants one-way sync rules (e.g. closing a conversation
//! when its ticket closes) layers them on as a [`TransitionHook`] without
//! touching either state machine.

use async_trait::async_trait;

use triago_core::{Conversation, ConversationStatus, Ticket, TicketStatus};

/// Invoked after each committed transition, once storage and the event bus
/// have both seen it. Hook failures are the hook's own problem: the
/// transition has already committed.
#[async_trait]
pub trait TransitionHook: Send + Sync + 'static {
    /// A conversation changed status.
    async fn on_conversation_transition(
        &self,
        _conversation: &Conversation,
        _previous: ConversationStatus,
    ) {
    }

    /// A ticket changed status.
    async fn on_ticket_transition(&self, _ticket: &Ticket, _previous: TicketStatus) {}
}
