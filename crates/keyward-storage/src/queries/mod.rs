// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite query providers.
//!
//! Statement text is written with `$NAME$` placeholders and resolved once at
//! construction. Everything handed to the engines afterwards is plain SQL.

pub mod sessions;
pub mod users;

pub use sessions::SqliteSessionQueries;
pub use users::SqliteUserQueries;
