// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket state machine: adjacency table, transition guard, reopen edges.

use triago_core::{TicketStatus, TriagoError};

/// Legal next states for a ticket in `from`.
pub fn allowed_transitions(from: TicketStatus) -> &'static [TicketStatus] {
    use TicketStatus::*;
    match from {
        New => &[Open, Cancelled],
        Open => &[InProgress, Cancelled],
        InProgress => &[PendingCustomer, Resolved, Cancelled],
        PendingCustomer => &[InProgress, Resolved, Cancelled],
        // `-> Open` are the named reopen edges; the service enforces the
        // bounded-reopen rules on them.
        Resolved => &[Closed, Open],
        Closed => &[Open],
        Cancelled => &[],
    }
}

/// Validate `(from, to)` against the adjacency table.
pub fn check_transition(from: TicketStatus, to: TicketStatus) -> Result<(), TriagoError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TriagoError::InvalidTransition {
            entity: "ticket",
            from: from.to_string(),
            to: to.to_string(),
            allowed: allowed_transitions(from)
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }
}

/// Whether `(from, to)` is one of the reopen edges.
pub fn is_reopen_edge(from: TicketStatus, to: TicketStatus) -> bool {
    use TicketStatus::*;
    matches!((from, to), (Resolved, Open) | (Closed, Open))
}
