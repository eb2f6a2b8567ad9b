// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities shared by every Keyward storage engine.
//!
//! # Components
//!
//! - [`MemoryUserStorage`] and [`MemorySessionStorage`]: reference engines
//!   that keep everything in process memory
//! - [`conformance`]: async checks any [`UserStorage`](keyward_core::UserStorage)
//!   or [`SessionStorage`](keyward_core::SessionStorage) must pass, each run
//!   against a freshly constructed store

pub mod conformance;
pub mod memory;

pub use memory::{MemorySessionStorage, MemoryUserStorage};
