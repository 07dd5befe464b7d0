// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock assistant adapter for deterministic testing.
//!
//! Replies echo the inbound text unless scripted responses are queued.
//! A configurable number of leading run-conflict failures exercises the
//! retry path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use triago_core::traits::adapter::PluginAdapter;
use triago_core::traits::assistant::AssistantAdapter;
use triago_core::types::{AdapterType, HealthStatus};
use triago_core::TriagoError;

/// A mock assistant for testing.
pub struct MockAssistant {
    scripted: Mutex<VecDeque<Result<String, TriagoError>>>,
    /// Number of calls that fail with `RunConflict` before succeeding.
    conflicts_remaining: AtomicU32,
    calls: AtomicU32,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            conflicts_remaining: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Queue a scripted reply (or error) returned before the echo default.
    pub async fn push_reply(&self, reply: Result<String, TriagoError>) {
        self.scripted.lock().await.push_back(reply);
    }

    /// Fail the next `n` calls with `RunConflict`.
    pub fn fail_with_conflicts(&self, n: u32) {
        self.conflicts_remaining.store(n, Ordering::SeqCst);
    }

    /// Total number of `reply` calls observed.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockAssistant {
    fn name(&self) -> &str {
        "mock-assistant"
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
impl AssistantAdapter for MockAssistant {
    async fn reply(
        &self,
        text: &str,
        _sender_id: &str,
        conversation_id: &str,
    ) -> Result<String, TriagoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TriagoError::RunConflict {
                conversation_id: conversation_id.to_string(),
            });
        }

        if let Some(scripted) = self.scripted.lock().await.pop_front() {
            return scripted;
        }

        Ok(format!("echo: {text}"))
    }
}
