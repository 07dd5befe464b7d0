// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Triago workspace.
//!
//! Conversations and tickets are the two persisted lifecycles; turns and
//! messages are the ephemeral units flowing through the pipeline. All
//! timestamps are RFC 3339 strings in UTC, matching the storage layer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Channel-assigned identifier for a delivered outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Assistant,
    Storage,
}

/// Current UTC time as an RFC 3339 string, the canonical timestamp format.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

// --- Lifecycle status enums ---

/// Status of a live chat session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Assistant-handled; no operator involved.
    Open,
    /// Claimed by an operator; assistant suppressed.
    Assigned,
    /// Operator claimed but idle.
    Waiting,
    /// Believed done, pending customer confirmation.
    Resolved,
    /// Terminal rest state, reachable again via reopen.
    Closed,
}

/// Status of a trackable unit of work.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    Open,
    InProgress,
    PendingCustomer,
    Resolved,
    Closed,
    Cancelled,
}

/// Who performed an action: recorded verbatim in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The customer, identified by their channel-level sender id.
    Customer(String),
    /// A human operator.
    Operator(String),
    /// The automated assistant.
    Assistant,
    /// Background processes (reconciliation sweep, handoff trigger).
    System,
}

impl Actor {
    /// Elevated roles may force-close conversations and manually reopen
    /// closed ones.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Actor::Operator(_) | Actor::System)
    }

    /// The operator id, if this actor is an operator.
    pub fn operator_id(&self) -> Option<&str> {
        match self {
            Actor::Operator(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Customer(id) => write!(f, "customer:{id}"),
            Actor::Operator(id) => write!(f, "operator:{id}"),
            Actor::Assistant => write!(f, "assistant"),
            Actor::System => write!(f, "system"),
        }
    }
}

// --- Persisted entities ---

/// One ongoing chat session with one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Opaque UUID, stable for the session's lifetime.
    pub id: String,
    /// Channel-level sender id of the customer.
    pub customer_id: String,
    /// Source channel name.
    pub channel: String,
    pub status: ConversationStatus,
    /// Set only while status is `assigned` or `waiting`.
    pub assigned_operator: Option<String>,
    /// False whenever an operator is actively assigned.
    pub assistant_enabled: bool,
    pub last_message_at: Option<String>,
    pub last_customer_message_at: Option<String>,
    /// Last message from an operator or the assistant.
    pub last_agent_message_at: Option<String>,
    pub resolved_at: Option<String>,
    pub resolved_by: Option<String>,
    pub closed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of a resolve action; cleared again on reopen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub summary: String,
    pub resolved_by: String,
    pub resolved_at: String,
}

/// A trackable unit of work, optionally linked 1:1 to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Human-readable ticket number, e.g. `TKT-2026-000042`.
    pub id: String,
    pub conversation_id: Option<String>,
    pub customer_id: String,
    pub subject: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: String,
    pub category: String,
    /// Present iff resolved/closed was reached through a resolve transition.
    pub resolution: Option<Resolution>,
    pub reopen_count: u32,
    pub last_reopened_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One row of the append-only ticket audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub ticket_id: String,
    pub previous: TicketStatus,
    pub next: TicketStatus,
    /// Display form of the acting [`Actor`].
    pub changed_by: String,
    pub changed_at: String,
    pub reason: Option<String>,
}

/// An ordered ticket note, tagged internal (operator-only) or external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Storage-assigned row id; 0 before insertion.
    pub id: i64,
    pub ticket_id: String,
    pub author: String,
    pub body: String,
    pub internal: bool,
    pub created_at: String,
}

// --- Pipeline types ---

/// Payload of an inbound channel message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageContent {
    Text(String),
    /// Reference to externally hosted media; enrichment is out of scope.
    Media {
        reference: String,
        caption: Option<String>,
    },
}

impl MessageContent {
    /// Text rendering used when merging items into a turn.
    pub fn to_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Media { reference, caption } => match caption {
                Some(c) => format!("[media] {reference}\n{c}"),
                None => format!("[media] {reference}"),
            },
        }
    }
}

/// A message as delivered by the channel adapter (at-least-once).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Externally assigned id; the dedup key.
    pub external_id: String,
    pub sender_id: String,
    pub channel: String,
    pub content: MessageContent,
    pub timestamp: String,
}

/// One logical unit of customer input, possibly merged from a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub sender_id: String,
    pub channel: String,
    /// Burst items concatenated in arrival order, separated by blank lines.
    pub text: String,
    pub message_count: usize,
    /// Arrival time of the first item in the burst.
    pub started_at: String,
}

/// A message to deliver through a channel adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient_id: String,
    pub channel: String,
    pub text: String,
}

// --- Change notifications ---

/// Broadcast on every committed state transition for observer UIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TicketCreated {
        ticket: Ticket,
    },
    TicketStatusChanged {
        ticket: Ticket,
        previous: TicketStatus,
    },
    ConversationUpdated {
        conversation: Conversation,
        previous: ConversationStatus,
    },
    NoteAdded {
        ticket_id: String,
        note: Note,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn conversation_status_round_trips_through_text() {
        for status in [
            ConversationStatus::Open,
            ConversationStatus::Assigned,
            ConversationStatus::Waiting,
            ConversationStatus::Resolved,
            ConversationStatus::Closed,
        ] {
            let s = status.to_string();
            assert_eq!(ConversationStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn ticket_status_uses_snake_case() {
        assert_eq!(TicketStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TicketStatus::PendingCustomer.to_string(), "pending_customer");
        assert_eq!(
            TicketStatus::from_str("pending_customer").unwrap(),
            TicketStatus::PendingCustomer
        );
    }

    #[test]
    fn actor_display_forms() {
        assert_eq!(Actor::Customer("42".into()).to_string(), "customer:42");
        assert_eq!(Actor::Operator("jo".into()).to_string(), "operator:jo");
        assert_eq!(Actor::Assistant.to_string(), "assistant");
        assert_eq!(Actor::System.to_string(), "system");
    }

    #[test]
    fn elevated_roles() {
        assert!(Actor::Operator("jo".into()).is_elevated());
        assert!(Actor::System.is_elevated());
        assert!(!Actor::Customer("42".into()).is_elevated());
        assert!(!Actor::Assistant.is_elevated());
    }

    #[test]
    fn media_content_to_text_keeps_caption() {
        let content = MessageContent::Media {
            reference: "https://cdn.example/img.png".into(),
            caption: Some("receipt".into()),
        };
        assert_eq!(
            content.to_text(),
            "[media] https://cdn.example/img.png\nreceipt"
        );
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let note = Note {
            id: 1,
            ticket_id: "TKT-2026-000001".into(),
            author: "operator:jo".into(),
            body: "called back".into(),
            internal: true,
            created_at: now_rfc3339(),
        };
        let event = Event::NoteAdded {
            ticket_id: note.ticket_id.clone(),
            note,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "note_added");
    }
}
