// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::TriagoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Conversation, ConversationStatus, Note, StatusChange, Ticket, TicketStatus,
};

/// Adapter for the persistence backend.
///
/// The backend must provide atomic single-row read-modify-write and an
/// atomic increment-and-fetch for sequence counters; beyond that the
/// query language is an implementation detail. A given conversation or
/// ticket is only ever mutated by one caller at a time (router, sweep,
/// or operator action on that specific id), so plain row updates are
/// sufficient outside the counter.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TriagoError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TriagoError>;

    // --- Conversation operations ---

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), TriagoError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, TriagoError>;

    /// The most recently updated conversation for a customer, any status.
    async fn latest_conversation_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Conversation>, TriagoError>;

    /// Replaces the full conversation row (single-document write).
    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), TriagoError>;

    async fn list_conversations_by_status(
        &self,
        status: ConversationStatus,
    ) -> Result<Vec<Conversation>, TriagoError>;

    // --- Ticket operations ---

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), TriagoError>;

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, TriagoError>;

    /// Replaces the full ticket row (single-document write).
    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), TriagoError>;

    /// Replaces the ticket row and appends its history entry atomically.
    ///
    /// The guarded transition path uses this so a status change and its
    /// audit row commit or fail together, never partially.
    async fn update_ticket_with_history(
        &self,
        ticket: &Ticket,
        change: &StatusChange,
    ) -> Result<(), TriagoError>;

    /// The ticket linked to a conversation at creation time, if any.
    async fn ticket_for_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Ticket>, TriagoError>;

    async fn list_tickets_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, TriagoError>;

    // --- Audit trail and notes ---

    /// Appends one history row. The history table is append-only.
    async fn append_status_change(&self, change: &StatusChange) -> Result<(), TriagoError>;

    /// Full status history for a ticket, in append order.
    async fn status_history(&self, ticket_id: &str) -> Result<Vec<StatusChange>, TriagoError>;

    /// Inserts a note and returns its storage-assigned id.
    async fn add_note(&self, note: &Note) -> Result<i64, TriagoError>;

    async fn notes(&self, ticket_id: &str) -> Result<Vec<Note>, TriagoError>;

    // --- Sequence counter ---

    /// Atomic increment-and-fetch of the per-period counter.
    ///
    /// Two concurrent callers for the same period never observe the same
    /// value.
    async fn next_sequence(&self, period: &str) -> Result<i64, TriagoError>;
}
