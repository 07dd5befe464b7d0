// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket CRUD operations.
//!
//! The resolution is stored flattened into three nullable columns; a row
//! has a resolution iff `resolution_summary` is non-null.

use rusqlite::{Row, params};

use triago_core::TriagoError;
use triago_core::types::{Resolution, Ticket, TicketStatus};

use crate::database::{Database, map_tr_err};
use crate::queries::column_enum;

const COLUMNS: &str = "id, conversation_id, customer_id, subject, description, \
                       status, priority, category, resolution_summary, resolution_by, \
                       resolution_at, reopen_count, last_reopened_at, created_at, updated_at";

fn row_to_ticket(row: &Row<'_>) -> Result<Ticket, rusqlite::Error> {
    let resolution_summary: Option<String> = row.get(8)?;
    let resolution = match resolution_summary {
        Some(summary) => Some(Resolution {
            summary,
            resolved_by: row.get(9)?,
            resolved_at: row.get(10)?,
        }),
        None => None,
    };
    Ok(Ticket {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        customer_id: row.get(2)?,
        subject: row.get(3)?,
        description: row.get(4)?,
        status: column_enum::<TicketStatus>(5, row.get(5)?)?,
        priority: row.get(6)?,
        category: row.get(7)?,
        resolution,
        reopen_count: row.get(11)?,
        last_reopened_at: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Insert a new ticket.
pub async fn insert_ticket(db: &Database, ticket: &Ticket) -> Result<(), TriagoError> {
    let t = ticket.clone();
    db.connection()
        .call(move |conn| {
            let (summary, by, at) = match &t.resolution {
                Some(r) => (
                    Some(r.summary.clone()),
                    Some(r.resolved_by.clone()),
                    Some(r.resolved_at.clone()),
                ),
                None => (None, None, None),
            };
            conn.execute(
                "INSERT INTO tickets
                   (id, conversation_id, customer_id, subject, description,
                    status, priority, category, resolution_summary, resolution_by,
                    resolution_at, reopen_count, last_reopened_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    t.id,
                    t.conversation_id,
                    t.customer_id,
                    t.subject,
                    t.description,
                    t.status.to_string(),
                    t.priority,
                    t.category,
                    summary,
                    by,
                    at,
                    t.reopen_count,
                    t.last_reopened_at,
                    t.created_at,
                    t.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a ticket by its human-readable id.
pub async fn get_ticket(db: &Database, id: &str) -> Result<Option<Ticket>, TriagoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM tickets WHERE id = ?1"))?;
            match stmt.query_row(params![id], row_to_ticket) {
                Ok(t) => Ok(Some(t)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

fn exec_update(conn: &rusqlite::Connection, t: &Ticket) -> Result<usize, rusqlite::Error> {
    let (summary, by, at) = match &t.resolution {
        Some(r) => (
            Some(r.summary.clone()),
            Some(r.resolved_by.clone()),
            Some(r.resolved_at.clone()),
        ),
        None => (None, None, None),
    };
    conn.execute(
        "UPDATE tickets SET
           conversation_id = ?2, customer_id = ?3, subject = ?4,
           description = ?5, status = ?6, priority = ?7, category = ?8,
           resolution_summary = ?9, resolution_by = ?10, resolution_at = ?11,
           reopen_count = ?12, last_reopened_at = ?13, updated_at = ?14
         WHERE id = ?1",
        params![
            t.id,
            t.conversation_id,
            t.customer_id,
            t.subject,
            t.description,
            t.status.to_string(),
            t.priority,
            t.category,
            summary,
            by,
            at,
            t.reopen_count,
            t.last_reopened_at,
            t.updated_at,
        ],
    )
}

/// Replace the full ticket row.
pub async fn update_ticket(db: &Database, ticket: &Ticket) -> Result<(), TriagoError> {
    let t = ticket.clone();
    db.connection()
        .call(move |conn| {
            exec_update(conn, &t)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the ticket row and append its history entry in one transaction.
///
/// Used by the guarded transition path so a status change and its audit
/// trail row commit or fail together.
pub async fn update_ticket_with_history(
    db: &Database,
    ticket: &Ticket,
    change: &triago_core::types::StatusChange,
) -> Result<(), TriagoError> {
    let t = ticket.clone();
    let c = change.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            exec_update(&tx, &t)?;
            tx.execute(
                "INSERT INTO ticket_status_history
                   (ticket_id, previous, next, changed_by, changed_at, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    c.ticket_id,
                    c.previous.to_string(),
                    c.next.to_string(),
                    c.changed_by,
                    c.changed_at,
                    c.reason,
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent ticket linked to a conversation, if any.
pub async fn ticket_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<Ticket>, TriagoError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM tickets
                 WHERE conversation_id = ?1
                 ORDER BY created_at DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![conversation_id], row_to_ticket) {
                Ok(t) => Ok(Some(t)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List tickets with the given status, oldest first.
pub async fn list_by_status(
    db: &Database,
    status: TicketStatus,
) -> Result<Vec<Ticket>, TriagoError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM tickets WHERE status = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![status], row_to_ticket)?;
            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row?);
            }
            Ok(tickets)
        })
        .await
        .map_err(map_tr_err)
}
