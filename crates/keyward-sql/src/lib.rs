// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialect-independent SQL engine for user and session storage.
//!
//! [`SqlUserStorage`] and [`SqlSessionStorage`] do not know any SQL dialect.
//! Statement text comes from a [`UserQueries`](keyward_core::UserQueries) or
//! [`SessionQueries`](keyward_core::SessionQueries) provider, parameter and
//! result conversion goes through a [`DriverBridge`](keyward_core::DriverBridge),
//! and statements run on a [`Backend`](keyward_core::Backend). Engine state is
//! immutable after construction, so one engine can serve concurrent callers.

pub mod init;
pub mod session;
pub mod user;

pub use init::run_init_statements;
pub use session::SqlSessionStorage;
pub use user::SqlUserStorage;

#[cfg(test)]
pub(crate) mod testing;
