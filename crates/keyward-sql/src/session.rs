// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic session engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{
    Backend, DriverBridge, DriverError, ExecOutcome, ScanKind, SessionEntry, SessionQueries,
    SessionStorage, SqlValue, StoreError, UserId,
};
use tracing::{debug, info};

use crate::init::run_init_statements;

/// [`SessionStorage`] on top of any backend, query provider and bridge.
pub struct SqlSessionStorage<B: ?Sized, Q, D> {
    backend: Arc<B>,
    queries: Q,
    bridge: D,
}

impl<B, Q, D> SqlSessionStorage<B, Q, D>
where
    B: Backend + ?Sized,
    Q: SessionQueries,
    D: DriverBridge,
{
    pub fn new(backend: Arc<B>, queries: Q, bridge: D) -> Self {
        Self {
            backend,
            queries,
            bridge,
        }
    }

    pub fn queries(&self) -> &Q {
        &self.queries
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

fn affected(outcome: ExecOutcome) -> Result<u64, StoreError> {
    outcome
        .rows_affected
        .ok_or(StoreError::Unsupported("affected row count"))
}

#[async_trait]
impl<B, Q, D> SessionStorage for SqlSessionStorage<B, Q, D>
where
    B: Backend + ?Sized,
    Q: SessionQueries,
    D: DriverBridge,
{
    async fn init_sessions(&self) -> Result<(), StoreError> {
        run_init_statements(self.backend.as_ref(), self.queries.init_statements(), "sessions").await
    }

    async fn insert_session(&self, session: &SessionEntry) -> Result<(), StoreError> {
        let params = vec![
            SqlValue::from(session.key.as_str()),
            SqlValue::Integer(session.user.0),
            self.bridge.timestamp_to_sql(session.expire_date),
        ];
        match self.backend.execute(self.queries.insert_session(), params).await {
            Ok(_) => {
                debug!(user_id = %session.user, "session inserted");
                Ok(())
            }
            Err(err) if self.bridge.is_duplicate_insert(&err) => Err(StoreError::SessionExists {
                key: session.key.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_session(&self, key: &str) -> Result<SessionEntry, StoreError> {
        let kinds = [
            ScanKind::Text,
            ScanKind::Integer,
            self.bridge.timestamp_scan_kind(),
        ];
        let mut row = match self
            .backend
            .query_row(self.queries.get_session(), vec![SqlValue::from(key)], &kinds)
            .await
        {
            Ok(row) => row,
            Err(DriverError::NoRows) => {
                return Err(StoreError::NoSuchSession {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        Ok(SessionEntry {
            key: row.take_string(0)?,
            user: UserId(row.take_i64(1)?),
            expire_date: self.bridge.timestamp_from_sql(row.take(2)?)?,
        })
    }

    async fn delete_session(&self, key: &str) -> Result<(), StoreError> {
        self.backend
            .execute(self.queries.delete_session(), vec![SqlValue::from(key)])
            .await?;
        Ok(())
    }

    async fn clean_up(&self, reference: DateTime<Utc>) -> Result<u64, StoreError> {
        let outcome = self
            .backend
            .execute(
                self.queries.delete_expired_before(),
                vec![self.bridge.timestamp_to_sql(reference)],
            )
            .await?;
        let removed = affected(outcome)?;
        info!(removed, reference = %reference, "expired sessions removed");
        Ok(removed)
    }

    async fn delete_for_user(&self, user: UserId) -> Result<u64, StoreError> {
        let outcome = self
            .backend
            .execute(self.queries.delete_for_user(), vec![SqlValue::Integer(user.0)])
            .await?;
        let removed = affected(outcome)?;
        debug!(user_id = %user, removed, "user sessions removed");
        Ok(removed)
    }
}
