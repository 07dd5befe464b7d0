// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Triago routing core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Triago configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriagoConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Duplicate-delivery cache settings.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Burst aggregation (debounce) settings.
    #[serde(default)]
    pub burst: BurstConfig,

    /// Assignment router settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Ticket workflow settings.
    #[serde(default)]
    pub ticket: TicketConfig,

    /// Reconciliation sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Change-notification bus settings.
    #[serde(default)]
    pub events: EventsConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of this instance.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "triago".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    "triago.db".to_string()
}

/// Duplicate-delivery cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// How long an external message id is remembered, in seconds.
    ///
    /// Must cover the upstream channel's retry window. Entries expire
    /// after this; a redelivery beyond it would be processed again.
    #[serde(default = "default_dedup_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_dedup_ttl_secs(),
        }
    }
}

fn default_dedup_ttl_secs() -> u64 {
    60
}

/// Burst aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BurstConfig {
    /// Debounce window in milliseconds. A sender must be silent for this
    /// long before their pending messages are dispatched as one turn.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    2000
}

/// Assignment router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Case-insensitive phrases that trigger a handoff to a human operator.
    #[serde(default = "default_handoff_triggers")]
    pub handoff_triggers: Vec<String>,

    /// Operator id that handoff-triggered conversations are assigned to.
    #[serde(default = "default_operator")]
    pub default_operator: String,

    /// Message sent to the customer after assistant retries are exhausted.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    /// Maximum assistant call attempts per turn (including the first).
    #[serde(default = "default_max_assistant_attempts")]
    pub max_assistant_attempts: u32,

    /// Base delay for exponential backoff between attempts, in milliseconds.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Cap on the backoff delay, in milliseconds.
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Whether resolving a conversation sends a confirmation prompt.
    #[serde(default = "default_true")]
    pub resolution_prompt_enabled: bool,

    /// The confirmation prompt text.
    #[serde(default = "default_resolution_prompt")]
    pub resolution_prompt: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            handoff_triggers: default_handoff_triggers(),
            default_operator: default_operator(),
            fallback_message: default_fallback_message(),
            max_assistant_attempts: default_max_assistant_attempts(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            resolution_prompt_enabled: true,
            resolution_prompt: default_resolution_prompt(),
        }
    }
}

fn default_handoff_triggers() -> Vec<String> {
    vec![
        "human".to_string(),
        "real person".to_string(),
        "talk to an agent".to_string(),
        "speak to someone".to_string(),
    ]
}

fn default_operator() -> String {
    "dispatch".to_string()
}

fn default_fallback_message() -> String {
    "Sorry, we're having trouble responding right now. \
     A member of our team will follow up shortly."
        .to_string()
}

fn default_max_assistant_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    500
}

fn default_retry_max_ms() -> u64 {
    5000
}

fn default_resolution_prompt() -> String {
    "It looks like this is resolved. Reply here if you need anything else, \
     and we'll pick it right back up."
        .to_string()
}

/// Ticket workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketConfig {
    /// Ticket number prefix, e.g. `TKT` in `TKT-2026-000042`.
    #[serde(default = "default_ticket_prefix")]
    pub prefix: String,

    /// Separator between prefix, period, and sequence.
    #[serde(default = "default_ticket_separator")]
    pub separator: String,

    /// Zero-padded width of the sequence component.
    #[serde(default = "default_sequence_width")]
    pub sequence_width: usize,

    /// Allowed ticket categories.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Allowed ticket priorities.
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,

    /// Maximum number of times a ticket may be reopened.
    #[serde(default = "default_max_reopen_count")]
    pub max_reopen_count: u32,

    /// Window after resolution during which automatic reopen is allowed,
    /// in hours. Manual (operator) reopens ignore the window.
    #[serde(default = "default_auto_reopen_window_hours")]
    pub auto_reopen_window_hours: u64,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            prefix: default_ticket_prefix(),
            separator: default_ticket_separator(),
            sequence_width: default_sequence_width(),
            categories: default_categories(),
            priorities: default_priorities(),
            max_reopen_count: default_max_reopen_count(),
            auto_reopen_window_hours: default_auto_reopen_window_hours(),
        }
    }
}

fn default_ticket_prefix() -> String {
    "TKT".to_string()
}

fn default_ticket_separator() -> String {
    "-".to_string()
}

fn default_sequence_width() -> usize {
    6
}

fn default_categories() -> Vec<String> {
    vec![
        "billing".to_string(),
        "technical".to_string(),
        "account".to_string(),
        "general".to_string(),
    ]
}

fn default_priorities() -> Vec<String> {
    vec![
        "low".to_string(),
        "normal".to_string(),
        "high".to_string(),
        "urgent".to_string(),
    ]
}

fn default_max_reopen_count() -> u32 {
    3
}

fn default_auto_reopen_window_hours() -> u64 {
    48
}

/// Reconciliation sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Interval between sweep passes, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,

    /// Assigned conversations idle for longer than this are released back
    /// to the assistant, in minutes.
    #[serde(default = "default_inactivity_release_minutes")]
    pub inactivity_release_minutes: u64,

    /// Resolved conversations unconfirmed for longer than this are closed,
    /// in hours.
    #[serde(default = "default_resolution_close_hours")]
    pub resolution_close_hours: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
            inactivity_release_minutes: default_inactivity_release_minutes(),
            resolution_close_hours: default_resolution_close_hours(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    120
}

fn default_inactivity_release_minutes() -> u64 {
    15
}

fn default_resolution_close_hours() -> u64 {
    24
}

/// Change-notification bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Broadcast channel capacity. Lagging subscribers lose oldest events.
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_bus_capacity(),
        }
    }
}

fn default_bus_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = TriagoConfig::default();
        assert_eq!(config.agent.name, "triago");
        assert_eq!(config.dedup.ttl_secs, 60);
        assert_eq!(config.burst.debounce_ms, 2000);
        assert_eq!(config.routing.max_assistant_attempts, 3);
        assert_eq!(config.ticket.prefix, "TKT");
        assert_eq!(config.ticket.auto_reopen_window_hours, 48);
        assert_eq!(config.sweep.inactivity_release_minutes, 15);
    }

    #[test]
    fn default_allow_lists_are_non_empty() {
        let config = TicketConfig::default();
        assert!(!config.categories.is_empty());
        assert!(!config.priorities.is_empty());
    }
}
