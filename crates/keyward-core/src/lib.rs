// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keyward account store.
//!
//! Defines the user and session records, the shared error taxonomy, the
//! traits a SQL dialect implements (backing store, driver bridge, query
//! providers), the storage traits callers program against, query template
//! substitution, and session key generation.

pub mod error;
pub mod fields;
pub mod session_key;
pub mod template;
pub mod traits;
pub mod types;
pub mod validate;
pub mod value;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DriverError, StoreError, UserLookup};
pub use fields::{FieldValue, UserColumns, UserField};
pub use session_key::{generate_session_key, insert_session_with_retry};
pub use template::{TemplateError, TemplateReplacer};
pub use types::{SessionEntry, UserId, UserModel, zero_instant};
pub use value::{Row, ScanKind, SqlValue};

pub use traits::{
    Backend, BatchFailure, DriverBridge, ExecOutcome, SessionQueries, SessionStorage, UserQueries,
    UserStorage,
};
