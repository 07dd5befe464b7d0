// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling storage, bus, and mock adapters.
//!
//! Opens a temp SQLite database and wires the mock channel and assistant,
//! so integration tests across the workspace start from one line instead
//! of a page of setup.

use std::sync::Arc;

use tempfile::TempDir;

use triago_bus::EventBus;
use triago_config::model::StorageConfig;
use triago_core::StorageAdapter;
use triago_storage::SqliteStorage;

use crate::mock_assistant::MockAssistant;
use crate::mock_channel::MockChannel;

/// A ready-to-use test environment.
///
/// The temp directory is held so the database file lives as long as the
/// harness.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub bus: EventBus,
    pub channel: Arc<MockChannel>,
    pub assistant: Arc<MockAssistant>,
    _dir: TempDir,
}

impl TestHarness {
    /// Build a harness with an initialized temp database.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("triago-test.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: path.to_str().expect("utf-8 path").to_string(),
            wal_mode: true,
        });
        storage.initialize().await.expect("initialize storage");

        Self {
            storage: Arc::new(storage),
            bus: EventBus::new(64),
            channel: Arc::new(MockChannel::new()),
            assistant: Arc::new(MockAssistant::new()),
            _dir: dir,
        }
    }
}
