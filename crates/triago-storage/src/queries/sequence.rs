// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic per-period sequence counter.
//!
//! The increment-and-fetch is a single upsert statement executed on the
//! single-writer connection, so two concurrent callers for the same period
//! can never observe the same value. No lock beyond the store's own
//! atomicity is involved.

use rusqlite::params;

use triago_core::TriagoError;

use crate::database::{Database, map_tr_err};

/// Increment the counter for `period` and return the new value.
///
/// The first call for a period returns 1.
pub async fn next_sequence(db: &Database, period: &str) -> Result<i64, TriagoError> {
    let period = period.to_string();
    db.connection()
        .call(move |conn| {
            let value: i64 = conn.query_row(
                "INSERT INTO sequence_counters (period, last_value) VALUES (?1, 1)
                 ON CONFLICT (period) DO UPDATE SET last_value = last_value + 1
                 RETURNING last_value",
                params![period],
                |row| row.get(0),
            )?;
            Ok(value)
        })
        .await
        .map_err(map_tr_err)
}
