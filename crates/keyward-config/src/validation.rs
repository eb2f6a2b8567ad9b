// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::KeywardConfig;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Table names are substituted into SQL text verbatim, so only plain
/// identifiers are accepted.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &KeywardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    for (key, name) in [
        ("storage.users_table", &config.storage.users_table),
        ("storage.sessions_table", &config.storage.sessions_table),
    ] {
        if !is_identifier(name) {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{name}` is not a valid SQL identifier"),
            });
        }
    }

    if config.storage.users_table == config.storage.sessions_table {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.users_table and storage.sessions_table are both `{}`",
                config.storage.users_table
            ),
        });
    }

    if config.session.key_retry_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "session.key_retry_attempts must be at least 1".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
