// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and diagnostics.

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use keyward_config::diagnostic::ConfigError;
use keyward_config::model::KeywardConfig;
use keyward_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[storage]
database_path = "/var/lib/keyward/accounts.db"
wal_mode = false
users_table = "accounts"
sessions_table = "logins"
email_unique = false

[session]
key_retry_attempts = 5

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.storage.database_path, "/var/lib/keyward/accounts.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.users_table, "accounts");
    assert_eq!(config.storage.sessions_table, "logins");
    assert!(!config.storage.email_unique);
    assert_eq!(config.session.key_retry_attempts, 5);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config, KeywardConfig::default());
    assert!(config.storage.database_path.ends_with("keyward.db"));
    assert!(config.storage.wal_mode);
    assert!(config.storage.email_unique);
    assert_eq!(config.storage.users_table, "auth_user");
    assert_eq!(config.storage.sessions_table, "auth_session");
    assert_eq!(config.session.key_retry_attempts, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn defaults_survive_a_toml_round_trip() {
    let rendered = toml::to_string(&KeywardConfig::default()).unwrap();
    let config = load_config_from_str(&rendered).unwrap();
    assert_eq!(config, KeywardConfig::default());
}

#[test]
fn later_layers_override_earlier_ones() {
    let config: KeywardConfig = Figment::new()
        .merge(Serialized::defaults(KeywardConfig::default()))
        .merge(Toml::string("[storage]\nusers_table = \"from_file\""))
        .merge(("storage.users_table", "from_env"))
        .extract()
        .expect("override should merge");
    assert_eq!(config.storage.users_table, "from_env");
}

#[test]
fn missing_file_is_skipped() {
    let config = load_config_from_path(std::path::Path::new("/nonexistent/keyward.toml"))
        .expect("missing file should be skipped");
    assert_eq!(config.storage.users_table, "auth_user");
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[agent]\nname = \"x\"\n").expect_err("unknown section");
    assert!(err.to_string().contains("agent"), "got: {err}");
}

#[test]
fn unknown_key_gets_a_suggestion() {
    let toml = r#"
[storage]
email_uniqe = false
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "email_uniqe"
                && suggestion.as_deref() == Some("email_unique")
                && valid_keys.contains("database_path")
        })
    });
    assert!(found, "expected UnknownKey for email_uniqe, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[session]
key_retry_attempts = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("key_retry_attempts"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_loading() {
    let toml = r#"
[storage]
users_table = "auth-user"

[session]
key_retry_attempts = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn diagnostics_render_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "wal_mod".to_string(),
        suggestion: Some("wal_mode".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `wal_mode`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("wal_mod"));
}
