// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits implemented by every engine, SQL or in-memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::fields::UserField;
use crate::types::{SessionEntry, UserId, UserModel};

/// Create, look up, update and delete user accounts.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Prepare the store (create tables and indexes).
    async fn init_users(&self) -> Result<(), StoreError>;

    async fn get_user(&self, id: UserId) -> Result<UserModel, StoreError>;

    async fn get_user_by_name(&self, username: &str) -> Result<UserModel, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<UserModel, StoreError>;

    /// Insert `user`, assigning its id, join date and zero last login.
    ///
    /// Any id on the model is ignored. On success the model's id is set to the
    /// returned id.
    async fn insert_user(&self, user: &mut UserModel) -> Result<UserId, StoreError>;

    /// Store `user`'s values for the user with `id`.
    ///
    /// An empty `fields` slice updates every field. Updating a missing id is
    /// not an error.
    async fn update_user(
        &self,
        id: UserId,
        user: &UserModel,
        fields: &[UserField],
    ) -> Result<(), StoreError>;

    /// Like [`update_user`](Self::update_user) with fields given by name.
    ///
    /// Names are matched case-insensitively. An unknown name fails with
    /// [`StoreError::UnknownField`] before the store is touched.
    async fn update_user_by_names(
        &self,
        id: UserId,
        user: &UserModel,
        names: &[&str],
    ) -> Result<(), StoreError> {
        let fields = UserField::parse_list(names)?;
        self.update_user(id, user, &fields).await
    }

    /// Remove a user. Removing a missing id is not an error.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
}

/// Store and expire login sessions.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn init_sessions(&self) -> Result<(), StoreError>;

    async fn insert_session(&self, session: &SessionEntry) -> Result<(), StoreError>;

    async fn get_session(&self, key: &str) -> Result<SessionEntry, StoreError>;

    /// Remove a session. Removing a missing key is not an error.
    async fn delete_session(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every session that is no longer valid at `reference` and return
    /// how many were removed.
    async fn clean_up(&self, reference: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Remove every session owned by `user` and return how many were removed.
    async fn delete_for_user(&self, user: UserId) -> Result<u64, StoreError>;
}
