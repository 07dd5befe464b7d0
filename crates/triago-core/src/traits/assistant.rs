// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant adapter trait for the automated-response collaborator.

use async_trait::async_trait;

use crate::error::TriagoError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the automated assistant.
///
/// The assistant call is opaque to the core: one combined turn in, one
/// reply out. Implementations may fail with
/// [`TriagoError::RunConflict`](crate::TriagoError::RunConflict) when a
/// run is already in flight for the conversation; callers retry with
/// bounded backoff.
#[async_trait]
pub trait AssistantAdapter: PluginAdapter {
    /// Produces a reply to a combined customer turn.
    async fn reply(
        &self,
        text: &str,
        sender_id: &str,
        conversation_id: &str,
    ) -> Result<String, TriagoError>;
}
