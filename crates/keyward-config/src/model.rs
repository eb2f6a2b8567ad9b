// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! Every struct rejects unknown keys so a typo fails at startup with a
//! suggestion instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Keyward configuration. All sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywardConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backing store and schema settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journaling for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Name substituted for `$USERS_TABLE_NAME$`.
    #[serde(default = "default_users_table")]
    pub users_table: String,

    /// Name substituted for `$SESSIONS_TABLE_NAME$`.
    #[serde(default = "default_sessions_table")]
    pub sessions_table: String,

    /// Whether the user table enforces unique email addresses.
    ///
    /// Must match the schema the tables were created with.
    #[serde(default = "default_true")]
    pub email_unique: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
            users_table: default_users_table(),
            sessions_table: default_sessions_table(),
            email_unique: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("keyward").join("keyward.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("keyward.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_users_table() -> String {
    "auth_user".to_string()
}

fn default_sessions_table() -> String {
    "auth_session".to_string()
}

fn default_true() -> bool {
    true
}

/// Session handling settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Inserts attempted by the collision retry helper before giving up.
    #[serde(default = "default_key_retry_attempts")]
    pub key_retry_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_retry_attempts: default_key_retry_attempts(),
        }
    }
}

fn default_key_retry_attempts() -> usize {
    3
}

/// Logging settings for the embedding application.
///
/// The Keyward crates only emit `tracing` events and never install a
/// subscriber, so nothing in this workspace reads these values beyond
/// validation. Applications pass `level` to their own subscriber setup.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `tracing` level filter for embedding applications.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
