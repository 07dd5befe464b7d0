// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guarded lifecycle state machines and their service layer.
//!
//! Two independent machines govern status: the conversation machine
//! (`open -> assigned -> waiting -> resolved -> closed`, with a restricted
//! reopen edge) and the richer ticket workflow. Both expose the same
//! shape: a pure adjacency table with a transition guard, and a service
//! that applies guarded transitions through storage, records side effects,
//! and publishes change notifications. The machines are deliberately not
//! synchronized with each other; the [`TransitionHook`] seam is where a
//! sync policy would attach.

pub mod conversation;
pub mod conversations;
pub mod hooks;
pub mod ticket;
pub mod tickets;

pub use conversations::{ConversationService, ResolutionPrompt};
pub use hooks::TransitionHook;
pub use tickets::{CreateTicketRequest, TicketService};
