// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later overriding earlier: compiled defaults,
//! `/etc/keyward/keyward.toml`, `~/.config/keyward/keyward.toml`,
//! `./keyward.toml`, then `KEYWARD_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KeywardConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/keyward/keyward.toml";
pub(crate) const LOCAL_CONFIG: &str = "keyward.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("keyward").join("keyward.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<KeywardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults, nothing else.
pub fn load_config_from_str(toml_content: &str) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeywardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map `KEYWARD_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the section prefix is split off, so `KEYWARD_STORAGE_DATABASE_PATH`
/// becomes `storage.database_path` rather than `storage.database.path`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("KEYWARD_").map(|key| map_env_key(key.as_str()).into())
}

/// Figment hands over the variable name in its original case.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["storage", "session", "logging"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("session_key_retry_attempts"), "session.key_retry_attempts");
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
        assert_eq!(map_env_key("STORAGE_USERS_TABLE"), "storage.users_table");
        assert_eq!(map_env_key("SESSION_KEY_RETRY_ATTEMPTS"), "session.key_retry_attempts");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(LOCAL_CONFIG, "[storage]\nusers_table = \"from_file\"\n")?;
            jail.set_env("KEYWARD_STORAGE_USERS_TABLE", "from_env");
            jail.set_env("KEYWARD_SESSION_KEY_RETRY_ATTEMPTS", "7");

            let config = load_config()?;
            assert_eq!(config.storage.users_table, "from_env");
            assert_eq!(config.session.key_retry_attempts, 7);
            Ok(())
        });
    }
}
