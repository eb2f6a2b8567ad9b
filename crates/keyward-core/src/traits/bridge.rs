// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-dialect conversion and error classification hooks.

use chrono::{DateTime, Utc};

use crate::error::{DriverError, StoreError};
use crate::value::{ScanKind, SqlValue};

/// Smooths over what drivers disagree on: how timestamps travel and how a
/// uniqueness violation is reported.
///
/// Implementations hold no state and are shared freely between operations.
pub trait DriverBridge: Send + Sync + 'static {
    /// How a timestamp column should be scanned.
    fn timestamp_scan_kind(&self) -> ScanKind;

    /// Convert a value scanned with [`timestamp_scan_kind`](Self::timestamp_scan_kind)
    /// into a UTC instant. Returns [`StoreError::TypeMismatch`] for anything else.
    fn timestamp_from_sql(&self, value: SqlValue) -> Result<DateTime<Utc>, StoreError>;

    /// Convert a UTC instant into a statement parameter for this driver.
    fn timestamp_to_sql(&self, instant: DateTime<Utc>) -> SqlValue;

    /// True if `err` is a uniqueness violation raised by an insert.
    fn is_duplicate_insert(&self, err: &DriverError) -> bool;

    /// True if `err` is a uniqueness violation raised by an update.
    ///
    /// Most drivers do not tell the two apart.
    fn is_duplicate_update(&self, err: &DriverError) -> bool {
        self.is_duplicate_insert(err)
    }
}
