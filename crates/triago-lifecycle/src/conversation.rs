// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state machine: adjacency table and transition guard.
//!
//! The reopen edge (`closed -> open`) is a named edge in the table, not a
//! separate code path, so the terminal-state invariants stay checkable in
//! one place. Role restrictions on that edge are enforced by the service
//! layer, which knows the acting party.

use triago_core::{ConversationStatus, TriagoError};

/// Legal next states for a conversation in `from`.
///
/// The normal path to `closed` runs through `resolved`; elevated roles may
/// additionally force-close from any non-terminal state, which the service
/// layer grants as an override on top of this table.
pub fn allowed_transitions(from: ConversationStatus) -> &'static [ConversationStatus] {
    use ConversationStatus::*;
    match from {
        Open => &[Assigned, Resolved],
        Assigned => &[Open, Waiting, Resolved],
        Waiting => &[Assigned, Open, Resolved],
        Resolved => &[Closed, Open],
        // Reopen edge; restricted to elevated roles and customer activity.
        Closed => &[Open],
    }
}

/// Validate `(from, to)` against the adjacency table.
pub fn check_transition(
    from: ConversationStatus,
    to: ConversationStatus,
) -> Result<(), TriagoError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TriagoError::InvalidTransition {
            entity: "conversation",
            from: from.to_string(),
            to: to.to_string(),
            allowed: allowed_transitions(from)
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }
}
