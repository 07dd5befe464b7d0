// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `triago serve`: run the engine on a local console channel.
//!
//! Production deployments plug a real channel provider and assistant in at
//! the adapter seams. For local operation and demos, this module wires a
//! stdin/stdout channel and a canned development assistant so the full
//! pipeline -- dedup, burst aggregation, routing, sweep -- runs end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::info;

use triago_config::TriagoConfig;
use triago_core::types::now_rfc3339;
use triago_core::{
    AdapterType, AssistantAdapter, ChannelAdapter, HealthStatus, InboundMessage,
    MessageContent, MessageId, OutboundMessage, PluginAdapter, StorageAdapter, TriagoError,
};
use triago_engine::{Engine, shutdown};
use triago_storage::SqliteStorage;

/// Run the engine until SIGINT/SIGTERM.
pub async fn run(config: TriagoConfig) -> Result<(), TriagoError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter + Send + Sync> = Arc::new(storage);

    let channel: Arc<dyn ChannelAdapter + Send + Sync> = Arc::new(StdioChannel::new());
    let assistant: Arc<dyn AssistantAdapter + Send + Sync> = Arc::new(DevAssistant);

    let mut engine = Engine::new(
        &config,
        storage,
        channel.clone(),
        // The console doubles as the operator console: forwarded turns are
        // printed with the operator id as recipient.
        channel,
        assistant,
    );

    info!(agent = %config.agent.name, "starting console session (Ctrl+C to stop)");
    println!("triago: type a message and press enter; Ctrl+C to stop");

    let cancel = shutdown::install_signal_handler();
    engine.run(cancel).await
}

/// Console channel: each stdin line is one inbound customer message;
/// outbound messages are printed to stdout.
struct StdioChannel {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    counter: AtomicU64,
}

impl StdioChannel {
    fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PluginAdapter for StdioChannel {
    fn name(&self) -> &str {
        "stdio"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, TriagoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriagoError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for StdioChannel {
    async fn connect(&mut self) -> Result<(), TriagoError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, TriagoError> {
        println!("-> {}: {}", msg.recipient_id, msg.text);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(MessageId(format!("stdio-out-{n}")))
    }

    async fn receive(&self) -> Result<InboundMessage, TriagoError> {
        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| TriagoError::Channel {
                message: "stdin read failed".to_string(),
                source: Some(Box::new(e)),
            })?
            .ok_or_else(|| TriagoError::Channel {
                message: "stdin closed".to_string(),
                source: None,
            })?;

        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(InboundMessage {
            external_id: format!("stdio-in-{n}"),
            sender_id: "console".to_string(),
            channel: "stdio".to_string(),
            content: MessageContent::Text(line),
            timestamp: now_rfc3339(),
        })
    }
}

/// Development stand-in for the external assistant collaborator.
struct DevAssistant;

#[async_trait]
impl PluginAdapter for DevAssistant {
    fn name(&self) -> &str {
        "dev-assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, TriagoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriagoError> {
        Ok(())
    }
}

#[async_trait]
impl AssistantAdapter for DevAssistant {
    async fn reply(
        &self,
        text: &str,
        _sender_id: &str,
        _conversation_id: &str,
    ) -> Result<String, TriagoError> {
        Ok(format!(
            "Thanks for your message! We've noted: \"{}\". Say \"human\" to reach an operator.",
            text.lines().next().unwrap_or_default()
        ))
    }
}
