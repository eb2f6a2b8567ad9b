// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the generic engine and a dialect.
//!
//! A dialect provides a [`Backend`], a [`DriverBridge`] and the two query
//! providers. Callers program against [`UserStorage`] and [`SessionStorage`].

pub mod backend;
pub mod bridge;
pub mod queries;
pub mod storage;

pub use backend::{Backend, BatchFailure, ExecOutcome};
pub use bridge::DriverBridge;
pub use queries::{SessionQueries, UserQueries};
pub use storage::{SessionStorage, UserStorage};
