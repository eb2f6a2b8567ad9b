// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite driver bridge.

use chrono::{DateTime, Utc};
use keyward_core::{DriverBridge, DriverError, ScanKind, SqlValue, StoreError};
use rusqlite::ErrorCode;
use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

/// Fixed-width UTC format; lexical order equals chronological order, which
/// the expiry sweep's `<=` comparison relies on.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

pub(crate) fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Timestamps as RFC 3339 text, duplicates as UNIQUE or PRIMARY KEY
/// constraint failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBridge;

impl DriverBridge for SqliteBridge {
    fn timestamp_scan_kind(&self) -> ScanKind {
        ScanKind::Text
    }

    fn timestamp_from_sql(&self, value: SqlValue) -> Result<DateTime<Utc>, StoreError> {
        match value {
            SqlValue::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| StoreError::TypeMismatch {
                    expected: "RFC 3339 timestamp",
                    found: format!("`{text}` ({e})"),
                }),
            SqlValue::Timestamp(t) => Ok(t),
            other => Err(StoreError::TypeMismatch {
                expected: "text",
                found: other.type_name().to_string(),
            }),
        }
    }

    fn timestamp_to_sql(&self, instant: DateTime<Utc>) -> SqlValue {
        SqlValue::Text(format_timestamp(instant))
    }

    fn is_duplicate_insert(&self, err: &DriverError) -> bool {
        matches!(
            err.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && (e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                        || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY)
        )
    }
}
