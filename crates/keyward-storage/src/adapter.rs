// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configured SQLite storage handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use keyward_config::{SessionConfig, StorageConfig, is_identifier};
use keyward_core::template::{EMAIL_UNIQUE, SESSIONS_TABLE_NAME, USERS_TABLE_NAME};
use keyward_core::{
    SessionEntry, SessionStorage, StoreError, TemplateReplacer, UserColumns, UserId, UserStorage,
    insert_session_with_retry,
};
use keyward_sql::{SqlSessionStorage, SqlUserStorage};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::bridge::SqliteBridge;
use crate::database::Database;
use crate::queries::{SqliteSessionQueries, SqliteUserQueries};

pub type SqliteUsers = SqlUserStorage<Database, SqliteUserQueries, SqliteBridge>;
pub type SqliteSessions = SqlSessionStorage<Database, SqliteSessionQueries, SqliteBridge>;

/// Placeholder values for the table names and email constraint in `config`.
///
/// Table names end up in SQL text verbatim and must be plain identifiers.
pub fn replacer_from_config(config: &StorageConfig) -> Result<TemplateReplacer, StoreError> {
    for table in [&config.users_table, &config.sessions_table] {
        if !is_identifier(table) {
            return Err(StoreError::InvalidTableName(table.clone()));
        }
    }
    let mut replacer = TemplateReplacer::new();
    replacer.set_many([
        (USERS_TABLE_NAME, config.users_table.as_str()),
        (SESSIONS_TABLE_NAME, config.sessions_table.as_str()),
        (EMAIL_UNIQUE, if config.email_unique { "UNIQUE" } else { "" }),
    ])?;
    Ok(replacer)
}

struct Opened {
    db: Arc<Database>,
    users: SqliteUsers,
    sessions: SqliteSessions,
}

/// SQLite-backed user and session storage.
///
/// Nothing is opened until [`initialize`](Self::initialize), which also
/// creates both tables.
pub struct SqliteStorage {
    config: StorageConfig,
    session: SessionConfig,
    columns: UserColumns,
    opened: OnceCell<Opened>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            session: SessionConfig::default(),
            columns: UserColumns::default(),
            opened: OnceCell::new(),
        }
    }

    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Use a custom field-to-column mapping for the user table.
    pub fn with_columns(mut self, columns: UserColumns) -> Self {
        self.columns = columns;
        self
    }

    fn opened(&self) -> Result<&Opened, StoreError> {
        self.opened.get().ok_or(StoreError::NotInitialized)
    }

    /// Open the database and create the user and session tables.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if self.opened.initialized() {
            return Err(StoreError::AlreadyInitialized);
        }

        let replacer = replacer_from_config(&self.config)?;
        let db = Arc::new(Database::open(&self.config.database_path, self.config.wal_mode).await?);
        let users = SqlUserStorage::new(
            Arc::clone(&db),
            SqliteUserQueries::new(&replacer, self.columns.clone()),
            SqliteBridge,
        );
        let sessions = SqlSessionStorage::new(
            Arc::clone(&db),
            SqliteSessionQueries::new(&replacer),
            SqliteBridge,
        );

        users.init_users().await?;
        sessions.init_sessions().await?;

        self.opened
            .set(Opened { db, users, sessions })
            .map_err(|_| StoreError::AlreadyInitialized)?;
        info!(
            path = %self.config.database_path,
            users_table = %self.config.users_table,
            sessions_table = %self.config.sessions_table,
            "SQLite storage initialized"
        );
        Ok(())
    }

    pub fn users(&self) -> Result<&SqliteUsers, StoreError> {
        Ok(&self.opened()?.users)
    }

    pub fn sessions(&self) -> Result<&SqliteSessions, StoreError> {
        Ok(&self.opened()?.sessions)
    }

    /// Create and store a session with a fresh key, retrying on key
    /// collisions as often as `session.key_retry_attempts` allows.
    pub async fn create_session(
        &self,
        user: UserId,
        expire_date: DateTime<Utc>,
    ) -> Result<SessionEntry, StoreError> {
        let sessions = self.sessions()?;
        let mut entry = SessionEntry::with_new_key(user, expire_date)?;
        insert_session_with_retry(sessions, &mut entry, self.session.key_retry_attempts).await?;
        Ok(entry)
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.opened()?.db.ping().await?;
        Ok(())
    }

    /// Checkpoint the write-ahead log.
    pub async fn close(&self) -> Result<(), StoreError> {
        let opened = self.opened()?;
        if self.config.wal_mode {
            opened.db.checkpoint().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}
