// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::TriagoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Adapter for bidirectional messaging channel integrations.
///
/// Channel adapters connect Triago to the upstream chat provider. Delivery
/// from the provider is at-least-once; the dedup cache downstream absorbs
/// redeliveries. Sends are fire-and-forget from the core's perspective but
/// logged by the caller.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), TriagoError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, TriagoError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, TriagoError>;
}
