// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory user and session engines.
//!
//! They implement the same contracts as the SQL engines, error taxonomy and
//! field semantics included, which makes them the reference the conformance
//! checks are validated against.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{
    SessionEntry, SessionStorage, StoreError, UserField, UserId, UserLookup, UserModel,
    UserStorage, zero_instant,
};
use tokio::sync::RwLock;
use tracing::debug;

struct UserTable {
    next_id: i64,
    users: BTreeMap<UserId, UserModel>,
}

impl UserTable {
    /// The first user other than `skip` for which `conflicts` holds.
    fn find_conflict(&self, skip: UserId, conflicts: impl Fn(&UserModel) -> bool) -> Option<&UserModel> {
        self.users
            .values()
            .find(|u| u.id != skip && conflicts(u))
    }
}

/// Users kept in a map guarded by a tokio `RwLock`. Ids start at 1.
pub struct MemoryUserStorage {
    email_unique: bool,
    table: RwLock<UserTable>,
}

impl MemoryUserStorage {
    pub fn new(email_unique: bool) -> Self {
        Self {
            email_unique,
            table: RwLock::new(UserTable {
                next_id: 1,
                users: BTreeMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn collides(&self, a: &UserModel, b: &UserModel) -> bool {
        a.username == b.username || (self.email_unique && a.email == b.email)
    }
}

impl Default for MemoryUserStorage {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn init_users(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<UserModel, StoreError> {
        self.table
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NoSuchUser(UserLookup::Id(id)))
    }

    async fn get_user_by_name(&self, username: &str) -> Result<UserModel, StoreError> {
        self.table
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchUser(UserLookup::Username(username.to_string())))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserModel, StoreError> {
        self.table
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchUser(UserLookup::Email(email.to_string())))
    }

    async fn insert_user(&self, user: &mut UserModel) -> Result<UserId, StoreError> {
        user.id = UserId::INVALID;
        user.date_joined = Utc::now();
        user.last_login = zero_instant();

        let mut table = self.table.write().await;
        let candidate: &UserModel = user;
        if let Some(existing) = table.find_conflict(UserId::INVALID, |u| self.collides(u, candidate)) {
            return Err(StoreError::UserExists(format!(
                "username `{}` or email `{}` is taken by user {}",
                user.username, user.email, existing.id
            )));
        }

        let id = UserId(table.next_id);
        table.next_id += 1;
        user.id = id;
        table.users.insert(id, user.clone());
        debug!(user_id = %id, "user inserted");
        Ok(id)
    }

    async fn update_user(
        &self,
        id: UserId,
        user: &UserModel,
        fields: &[UserField],
    ) -> Result<(), StoreError> {
        let fields = if fields.is_empty() { &UserField::ALL[..] } else { fields };

        let mut table = self.table.write().await;
        let Some(current) = table.users.get(&id) else {
            debug!(user_id = %id, "update matched no user");
            return Ok(());
        };

        let mut updated = current.clone();
        for field in fields {
            field.copy_into(&mut updated, user);
        }

        if let Some(other) = table.find_conflict(id, |u| self.collides(u, &updated)) {
            return Err(StoreError::AmbiguousUpdate(format!(
                "update of user {id} collides with user {}",
                other.id
            )));
        }
        table.users.insert(id, updated);
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.table.write().await.users.remove(&id);
        Ok(())
    }
}

/// Sessions kept in a map keyed by session key.
#[derive(Default)]
pub struct MemorySessionStorage {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn remove_where(&self, pred: impl Fn(&SessionEntry) -> bool) -> u64 {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !pred(s));
        (before - sessions.len()) as u64
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn init_sessions(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_session(&self, session: &SessionEntry) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.key) {
            return Err(StoreError::SessionExists {
                key: session.key.clone(),
            });
        }
        sessions.insert(session.key.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, key: &str) -> Result<SessionEntry, StoreError> {
        self.sessions
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchSession {
                key: key.to_string(),
            })
    }

    async fn delete_session(&self, key: &str) -> Result<(), StoreError> {
        self.sessions.write().await.remove(key);
        Ok(())
    }

    async fn clean_up(&self, reference: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(self.remove_where(|s| !s.is_valid(reference)).await)
    }

    async fn delete_for_user(&self, user: UserId) -> Result<u64, StoreError> {
        Ok(self.remove_where(|s| s.user == user).await)
    }
}
