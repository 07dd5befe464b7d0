// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use rusqlite::{Row, params};

use triago_core::TriagoError;
use triago_core::types::{Conversation, ConversationStatus};

use crate::database::{Database, map_tr_err};
use crate::queries::column_enum;

const COLUMNS: &str = "id, customer_id, channel, status, assigned_operator, \
                       assistant_enabled, last_message_at, last_customer_message_at, \
                       last_agent_message_at, resolved_at, resolved_by, closed_at, \
                       created_at, updated_at";

fn row_to_conversation(row: &Row<'_>) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        channel: row.get(2)?,
        status: column_enum::<ConversationStatus>(3, row.get(3)?)?,
        assigned_operator: row.get(4)?,
        assistant_enabled: row.get(5)?,
        last_message_at: row.get(6)?,
        last_customer_message_at: row.get(7)?,
        last_agent_message_at: row.get(8)?,
        resolved_at: row.get(9)?,
        resolved_by: row.get(10)?,
        closed_at: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

/// Insert a new conversation.
pub async fn insert_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), TriagoError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations
                   (id, customer_id, channel, status, assigned_operator,
                    assistant_enabled, last_message_at, last_customer_message_at,
                    last_agent_message_at, resolved_at, resolved_by, closed_at,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    c.id,
                    c.customer_id,
                    c.channel,
                    c.status.to_string(),
                    c.assigned_operator,
                    c.assistant_enabled,
                    c.last_message_at,
                    c.last_customer_message_at,
                    c.last_agent_message_at,
                    c.resolved_at,
                    c.resolved_by,
                    c.closed_at,
                    c.created_at,
                    c.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id.
pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, TriagoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], row_to_conversation) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// The most recently updated conversation for a customer, any status.
pub async fn latest_for_customer(
    db: &Database,
    customer_id: &str,
) -> Result<Option<Conversation>, TriagoError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations
                 WHERE customer_id = ?1
                 ORDER BY updated_at DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![customer_id], row_to_conversation) {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the full conversation row.
pub async fn update_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), TriagoError> {
    let c = conversation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET
                   customer_id = ?2, channel = ?3, status = ?4,
                   assigned_operator = ?5, assistant_enabled = ?6,
                   last_message_at = ?7, last_customer_message_at = ?8,
                   last_agent_message_at = ?9, resolved_at = ?10,
                   resolved_by = ?11, closed_at = ?12, updated_at = ?13
                 WHERE id = ?1",
                params![
                    c.id,
                    c.customer_id,
                    c.channel,
                    c.status.to_string(),
                    c.assigned_operator,
                    c.assistant_enabled,
                    c.last_message_at,
                    c.last_customer_message_at,
                    c.last_agent_message_at,
                    c.resolved_at,
                    c.resolved_by,
                    c.closed_at,
                    c.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List conversations with the given status, oldest activity first.
pub async fn list_by_status(
    db: &Database,
    status: ConversationStatus,
) -> Result<Vec<Conversation>, TriagoError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations
                 WHERE status = ?1 ORDER BY updated_at ASC"
            ))?;
            let rows = stmt.query_map(params![status], row_to_conversation)?;
            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row?);
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}
