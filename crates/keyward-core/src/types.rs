// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User and session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::session_key::generate_session_key;

/// Identifier of a stored user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// Sentinel meaning "no valid id".
    pub const INVALID: UserId = UserId(-1);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The instant stored in `last_login` for users that never logged in.
pub fn zero_instant() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// A user account as stored by the engines.
///
/// `password` holds an opaque hash, never clear text. `id`, `date_joined` and
/// `last_login` are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl Default for UserModel {
    fn default() -> Self {
        Self {
            id: UserId::INVALID,
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            is_active: false,
            is_superuser: false,
            is_staff: false,
            date_joined: zero_instant(),
            last_login: zero_instant(),
        }
    }
}

impl UserModel {
    /// A new, not yet inserted user with the given credentials.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// False until `last_login` is set to something other than the zero instant.
    pub fn has_logged_in(&self) -> bool {
        self.last_login != zero_instant()
    }
}

/// A login session owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub key: String,
    pub user: UserId,
    pub expire_date: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(key: impl Into<String>, user: UserId, expire_date: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            user,
            expire_date,
        }
    }

    /// Create a session with a freshly generated random key.
    pub fn with_new_key(user: UserId, expire_date: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self::new(generate_session_key()?, user, expire_date))
    }

    /// A session is valid at `reference` iff `reference` is strictly before its expiry.
    pub fn is_valid(&self, reference: DateTime<Utc>) -> bool {
        reference < self.expire_date
    }
}
