// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Triago routing core.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Triago workspace: the conversation and
//! ticket entities, the pipeline message types, and the adapter seams for
//! the channel, assistant, and storage collaborators.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TriagoError;
pub use types::{
    Actor, AdapterType, Conversation, ConversationStatus, Event, HealthStatus,
    InboundMessage, MessageContent, MessageId, Note, OutboundMessage, Resolution,
    StatusChange, Ticket, TicketStatus, Turn,
};

// Re-export all adapter traits at crate root.
pub use traits::{AssistantAdapter, ChannelAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = TriagoError::Config("test".into());
        let _storage = TriagoError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = TriagoError::Channel {
            message: "test".into(),
            source: None,
        };
        let _conflict = TriagoError::RunConflict {
            conversation_id: "c1".into(),
        };
        let _invalid = TriagoError::InvalidTransition {
            entity: "ticket",
            from: "new".into(),
            to: "resolved".into(),
            allowed: vec!["open".into(), "cancelled".into()],
        };
        let _reopen = TriagoError::ReopenNotAllowed {
            entity: "ticket",
            id: "TKT-2026-000001".into(),
            reason: "reopen window elapsed".into(),
        };
    }

    #[test]
    fn invalid_transition_lists_allowed_states() {
        let err = TriagoError::InvalidTransition {
            entity: "conversation",
            from: "closed".into(),
            to: "waiting".into(),
            allowed: vec!["open".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("closed -> waiting"));
        assert!(msg.contains("allowed: open"));
    }

    #[test]
    fn retryable_classification() {
        assert!(
            TriagoError::RunConflict {
                conversation_id: "c1".into()
            }
            .is_retryable()
        );
        assert!(
            !TriagoError::ReopenNotAllowed {
                entity: "ticket",
                id: "t1".into(),
                reason: "count exceeded".into()
            }
            .is_retryable()
        );
        assert!(!TriagoError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // If any adapter trait is missing or fails to compile, this test
        // won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_assistant_adapter<T: AssistantAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
