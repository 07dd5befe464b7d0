// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Triago routing core.

use thiserror::Error;

/// The primary error type used across all Triago adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TriagoError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, send failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Assistant adapter errors (API failure, malformed response).
    #[error("assistant error: {message}")]
    Assistant {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The assistant already has a run in flight for this conversation.
    ///
    /// Retryable: callers back off and retry a bounded number of times.
    #[error("assistant run conflict for conversation {conversation_id}")]
    RunConflict { conversation_id: String },

    /// A requested status change is not present in the adjacency table.
    ///
    /// Carries the legal next states so callers can report what would
    /// have been accepted.
    #[error("invalid {entity} transition {from} -> {to} (allowed: {})", .allowed.join(", "))]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
        allowed: Vec<String>,
    },

    /// A reopen was rejected by the bounded-reopen rules.
    ///
    /// Business error, never fatal: the entity is left unchanged.
    #[error("reopen of {entity} {id} not allowed: {reason}")]
    ReopenNotAllowed {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// A ticket field failed allow-list validation.
    #[error("invalid {field} `{value}` (allowed: {allowed})")]
    InvalidField {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TriagoError {
    /// Whether a failed downstream call may be retried with backoff.
    ///
    /// Covers assistant run conflicts, transient assistant/channel
    /// failures, and timeouts. Everything else is request-local.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TriagoError::RunConflict { .. }
                | TriagoError::Assistant { .. }
                | TriagoError::Channel { .. }
                | TriagoError::Timeout { .. }
        )
    }
}
