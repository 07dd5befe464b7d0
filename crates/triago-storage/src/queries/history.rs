// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only status history and ticket notes.

use rusqlite::params;

use triago_core::TriagoError;
use triago_core::types::{Note, StatusChange, TicketStatus};

use crate::database::{Database, map_tr_err};
use crate::queries::column_enum;

/// Append one history row. The table never sees UPDATE or DELETE.
pub async fn append_status_change(
    db: &Database,
    change: &StatusChange,
) -> Result<(), TriagoError> {
    let c = change.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
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
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Full status history for a ticket, in append order.
pub async fn status_history(
    db: &Database,
    ticket_id: &str,
) -> Result<Vec<StatusChange>, TriagoError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ticket_id, previous, next, changed_by, changed_at, reason
                 FROM ticket_status_history
                 WHERE ticket_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![ticket_id], |row| {
                Ok(StatusChange {
                    ticket_id: row.get(0)?,
                    previous: column_enum::<TicketStatus>(1, row.get(1)?)?,
                    next: column_enum::<TicketStatus>(2, row.get(2)?)?,
                    changed_by: row.get(3)?,
                    changed_at: row.get(4)?,
                    reason: row.get(5)?,
                })
            })?;
            let mut changes = Vec::new();
            for row in rows {
                changes.push(row?);
            }
            Ok(changes)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a note. Returns the storage-assigned row id.
pub async fn add_note(db: &Database, note: &Note) -> Result<i64, TriagoError> {
    let n = note.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ticket_notes (ticket_id, author, body, internal, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![n.ticket_id, n.author, n.body, n.internal, n.created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Notes for a ticket, in insertion order.
pub async fn notes(db: &Database, ticket_id: &str) -> Result<Vec<Note>, TriagoError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ticket_id, author, body, internal, created_at
                 FROM ticket_notes WHERE ticket_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![ticket_id], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    ticket_id: row.get(1)?,
                    author: row.get(2)?,
                    body: row.get(3)?,
                    internal: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut notes = Vec::new();
            for row in rows {
                notes.push(row?);
            }
            Ok(notes)
        })
        .await
        .map_err(map_tr_err)
}
