// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoff trigger detection.
//!
//! Zero-cost heuristic check for explicit requests to talk to a person.
//! Case-insensitive substring match against the configured trigger
//! phrases; no network, no latency.

/// Whether the turn text asks for a human operator.
pub fn matches_handoff(text: &str, triggers: &[String]) -> bool {
    if triggers.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    triggers
        .iter()
        .filter(|t| !t.trim().is_empty())
        .any(|t| lower.contains(&t.to_lowercase()))
}
