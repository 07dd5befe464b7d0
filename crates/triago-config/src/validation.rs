// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive durations and non-empty allow-lists.

use crate::diagnostic::ConfigError;
use crate::model::TriagoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TriagoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.dedup.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dedup.ttl_secs must be positive".to_string(),
        });
    }

    if config.burst.debounce_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "burst.debounce_ms must be positive".to_string(),
        });
    }

    if config.routing.max_assistant_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "routing.max_assistant_attempts must be at least 1".to_string(),
        });
    }

    if config.routing.retry_base_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "routing.retry_base_ms must be positive".to_string(),
        });
    }

    if config.routing.retry_max_ms < config.routing.retry_base_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "routing.retry_max_ms ({}) must not be below routing.retry_base_ms ({})",
                config.routing.retry_max_ms, config.routing.retry_base_ms
            ),
        });
    }

    if config.routing.default_operator.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "routing.default_operator must not be empty".to_string(),
        });
    }

    if config.ticket.prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ticket.prefix must not be empty".to_string(),
        });
    }

    if config.ticket.sequence_width == 0 || config.ticket.sequence_width > 12 {
        errors.push(ConfigError::Validation {
            message: format!(
                "ticket.sequence_width must be between 1 and 12, got {}",
                config.ticket.sequence_width
            ),
        });
    }

    if config.ticket.categories.is_empty() {
        errors.push(ConfigError::Validation {
            message: "ticket.categories must list at least one category".to_string(),
        });
    }

    if config.ticket.priorities.is_empty() {
        errors.push(ConfigError::Validation {
            message: "ticket.priorities must list at least one priority".to_string(),
        });
    }

    if config.sweep.interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "sweep.interval_secs must be positive".to_string(),
        });
    }

    if config.sweep.inactivity_release_minutes == 0 {
        errors.push(ConfigError::Validation {
            message: "sweep.inactivity_release_minutes must be positive".to_string(),
        });
    }

    if config.events.capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "events.capacity must be positive".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
