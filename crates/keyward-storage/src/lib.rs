// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite dialect for the Keyward account store.
//!
//! [`Database`] runs statements on a single `tokio-rusqlite` connection,
//! [`SqliteBridge`] stores timestamps as fixed-width RFC 3339 text and
//! recognizes SQLite uniqueness violations, and the query providers in
//! [`queries`] resolve their table names from a
//! [`TemplateReplacer`](keyward_core::TemplateReplacer). [`SqliteStorage`]
//! wires all of it together from a [`StorageConfig`](keyward_config::StorageConfig).

pub mod adapter;
pub mod bridge;
pub mod database;
pub mod queries;

pub use adapter::{SqliteSessions, SqliteStorage, SqliteUsers, replacer_from_config};
pub use bridge::SqliteBridge;
pub use database::Database;
pub use queries::{SqliteSessionQueries, SqliteUserQueries};
