// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use triago_config::model::StorageConfig;
use triago_core::types::{
    Conversation, ConversationStatus, Note, StatusChange, Ticket, TicketStatus,
};
use triago_core::{AdapterType, HealthStatus, PluginAdapter, StorageAdapter, TriagoError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, TriagoError> {
        self.db.get().ok_or_else(|| TriagoError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TriagoError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriagoError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TriagoError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TriagoError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TriagoError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Conversation operations ---

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), TriagoError> {
        queries::conversations::insert_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, TriagoError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn latest_conversation_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Conversation>, TriagoError> {
        queries::conversations::latest_for_customer(self.db()?, customer_id).await
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), TriagoError> {
        queries::conversations::update_conversation(self.db()?, conversation).await
    }

    async fn list_conversations_by_status(
        &self,
        status: ConversationStatus,
    ) -> Result<Vec<Conversation>, TriagoError> {
        queries::conversations::list_by_status(self.db()?, status).await
    }

    // --- Ticket operations ---

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), TriagoError> {
        queries::tickets::insert_ticket(self.db()?, ticket).await
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, TriagoError> {
        queries::tickets::get_ticket(self.db()?, id).await
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), TriagoError> {
        queries::tickets::update_ticket(self.db()?, ticket).await
    }

    async fn update_ticket_with_history(
        &self,
        ticket: &Ticket,
        change: &StatusChange,
    ) -> Result<(), TriagoError> {
        queries::tickets::update_ticket_with_history(self.db()?, ticket, change).await
    }

    async fn ticket_for_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Ticket>, TriagoError> {
        queries::tickets::ticket_for_conversation(self.db()?, conversation_id).await
    }

    async fn list_tickets_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, TriagoError> {
        queries::tickets::list_by_status(self.db()?, status).await
    }

    // --- Audit trail and notes ---

    async fn append_status_change(&self, change: &StatusChange) -> Result<(), TriagoError> {
        queries::history::append_status_change(self.db()?, change).await
    }

    async fn status_history(&self, ticket_id: &str) -> Result<Vec<StatusChange>, TriagoError> {
        queries::history::status_history(self.db()?, ticket_id).await
    }

    async fn add_note(&self, note: &Note) -> Result<i64, TriagoError> {
        queries::history::add_note(self.db()?, note).await
    }

    async fn notes(&self, ticket_id: &str) -> Result<Vec<Note>, TriagoError> {
        queries::history::notes(self.db()?, ticket_id).await
    }

    // --- Sequence counter ---

    async fn next_sequence(&self, period: &str) -> Result<i64, TriagoError> {
        queries::sequence::next_sequence(self.db()?, period).await
    }
}
