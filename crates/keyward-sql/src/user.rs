// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic user engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use keyward_core::{
    Backend, DriverBridge, DriverError, FieldValue, Row, ScanKind, SqlValue, StoreError,
    UserField, UserId, UserLookup, UserModel, UserQueries, UserStorage, zero_instant,
};
use tracing::debug;

use crate::init::run_init_statements;

/// [`UserStorage`] on top of any backend, query provider and bridge.
pub struct SqlUserStorage<B: ?Sized, Q, D> {
    backend: Arc<B>,
    queries: Q,
    bridge: D,
}

impl<B, Q, D> SqlUserStorage<B, Q, D>
where
    B: Backend + ?Sized,
    Q: UserQueries,
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

    fn scan_kinds(&self) -> [ScanKind; 11] {
        let ts = self.bridge.timestamp_scan_kind();
        [
            ScanKind::Integer,
            ScanKind::Text,
            ScanKind::Text,
            ScanKind::Text,
            ScanKind::Text,
            ScanKind::Text,
            ScanKind::Bool,
            ScanKind::Bool,
            ScanKind::Bool,
            ts,
            ts,
        ]
    }

    fn row_to_user(&self, mut row: Row) -> Result<UserModel, StoreError> {
        Ok(UserModel {
            id: UserId(row.take_i64(0)?),
            username: row.take_string(1)?,
            password: row.take_string(2)?,
            email: row.take_string(3)?,
            first_name: row.take_string(4)?,
            last_name: row.take_string(5)?,
            is_superuser: row.take_bool(6)?,
            is_staff: row.take_bool(7)?,
            is_active: row.take_bool(8)?,
            date_joined: self.bridge.timestamp_from_sql(row.take(9)?)?,
            last_login: self.bridge.timestamp_from_sql(row.take(10)?)?,
        })
    }

    async fn fetch(
        &self,
        statement: &str,
        key: SqlValue,
        lookup: UserLookup,
    ) -> Result<UserModel, StoreError> {
        match self
            .backend
            .query_row(statement, vec![key], &self.scan_kinds())
            .await
        {
            Ok(row) => self.row_to_user(row),
            Err(DriverError::NoRows) => Err(StoreError::NoSuchUser(lookup)),
            Err(err) => Err(err.into()),
        }
    }

    fn field_params(&self, user: &UserModel, fields: &[UserField]) -> Vec<SqlValue> {
        fields
            .iter()
            .map(|field| match field.value_of(user) {
                FieldValue::Plain(value) => value,
                FieldValue::Timestamp(t) => self.bridge.timestamp_to_sql(t),
            })
            .collect()
    }
}

#[async_trait]
impl<B, Q, D> UserStorage for SqlUserStorage<B, Q, D>
where
    B: Backend + ?Sized,
    Q: UserQueries,
    D: DriverBridge,
{
    async fn init_users(&self) -> Result<(), StoreError> {
        run_init_statements(self.backend.as_ref(), self.queries.init_statements(), "users").await
    }

    async fn get_user(&self, id: UserId) -> Result<UserModel, StoreError> {
        self.fetch(self.queries.get_user(), SqlValue::Integer(id.0), UserLookup::Id(id))
            .await
    }

    async fn get_user_by_name(&self, username: &str) -> Result<UserModel, StoreError> {
        self.fetch(
            self.queries.get_user_by_name(),
            SqlValue::from(username),
            UserLookup::Username(username.to_string()),
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserModel, StoreError> {
        self.fetch(
            self.queries.get_user_by_email(),
            SqlValue::from(email),
            UserLookup::Email(email.to_string()),
        )
        .await
    }

    async fn insert_user(&self, user: &mut UserModel) -> Result<UserId, StoreError> {
        user.id = UserId::INVALID;
        user.date_joined = Utc::now();
        user.last_login = zero_instant();

        let params = self.field_params(user, &UserField::ALL);
        let outcome = match self.backend.execute(self.queries.insert_user(), params).await {
            Ok(outcome) => outcome,
            Err(err) if self.bridge.is_duplicate_insert(&err) => {
                return Err(StoreError::UserExists(format!(
                    "username `{}` or email `{}`: {err}",
                    user.username, user.email
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let id = outcome
            .last_insert_id
            .map(UserId)
            .ok_or(StoreError::Unsupported("last insert id"))?;
        user.id = id;
        debug!(user_id = %id, username = %user.username, "user inserted");
        Ok(id)
    }

    async fn update_user(
        &self,
        id: UserId,
        user: &UserModel,
        fields: &[UserField],
    ) -> Result<(), StoreError> {
        let (statement, mut params) = if self.queries.supports_user_fields() && !fields.is_empty() {
            (
                self.queries.update_user(Some(fields)),
                self.field_params(user, fields),
            )
        } else {
            (
                self.queries.update_user(None),
                self.field_params(user, &UserField::ALL),
            )
        };
        params.push(SqlValue::Integer(id.0));

        match self.backend.execute(&statement, params).await {
            Ok(outcome) => {
                if outcome.rows_affected == Some(0) {
                    debug!(user_id = %id, "update matched no user");
                }
                Ok(())
            }
            Err(err) if self.bridge.is_duplicate_update(&err) => Err(StoreError::AmbiguousUpdate(
                format!("update of user {id} collides with another user: {err}"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.backend
            .execute(self.queries.delete_user(), vec![SqlValue::Integer(id.0)])
            .await?;
        debug!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use keyward_core::ExecOutcome;

    use super::*;
    use crate::testing::{
        MockBackend, MockBridge, MockUserQueries, driver_failure, duplicate_failure,
    };

    fn engine(partial: bool) -> (Arc<MockBackend>, SqlUserStorage<MockBackend, MockUserQueries, MockBridge>) {
        let backend = Arc::new(MockBackend::new());
        let users = SqlUserStorage::new(Arc::clone(&backend), MockUserQueries::new(partial), MockBridge);
        (backend, users)
    }

    fn stored_row() -> Row {
        let joined = Utc.with_ymd_and_hms(2019, 9, 1, 12, 0, 0).unwrap();
        Row::new(vec![
            SqlValue::Integer(3),
            SqlValue::from("user-three"),
            SqlValue::from("hash"),
            SqlValue::from("three@example.org"),
            SqlValue::from("Ada"),
            SqlValue::from("Lovelace"),
            SqlValue::Integer(1),
            SqlValue::Bool(false),
            SqlValue::Bool(true),
            SqlValue::Timestamp(joined),
            SqlValue::Timestamp(zero_instant()),
        ])
    }

    #[tokio::test]
    async fn lookup_scans_eleven_columns() {
        let (backend, users) = engine(true);
        backend.push_row(Ok(stored_row()));

        let user = users.get_user_by_name("user-three").await.unwrap();
        assert_eq!(user.id, UserId(3));
        assert_eq!(user.email, "three@example.org");
        assert!(user.is_superuser && !user.is_staff && user.is_active);
        assert!(!user.has_logged_in());

        let queried = backend.queried();
        assert_eq!(queried[0].0, "user by name");
        assert_eq!(queried[0].1, vec![SqlValue::from("user-three")]);
        assert_eq!(queried[0].2.len(), 11);
        assert_eq!(queried[0].2[9], ScanKind::Timestamp);
    }

    #[tokio::test]
    async fn missing_user_is_tagged_with_lookup_key() {
        let (_, users) = engine(true);
        let err = users.get_user_by_email("nobody@example.org").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NoSuchUser(UserLookup::Email(ref e)) if e == "nobody@example.org"
        ));
    }

    #[tokio::test]
    async fn other_lookup_failures_pass_through() {
        let (backend, users) = engine(true);
        backend.push_row(Err(driver_failure("disk I/O error")));
        let err = users.get_user(UserId(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Driver(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let (backend, users) = engine(true);
        backend.push_exec(Ok(ExecOutcome {
            rows_affected: Some(1),
            last_insert_id: Some(42),
        }));

        let mut user = UserModel::new("user1", "one@example.org");
        user.id = UserId(9);
        user.last_login = Utc::now();
        let before = Utc::now();
        let id = users.insert_user(&mut user).await.unwrap();

        assert_eq!(id, UserId(42));
        assert_eq!(user.id, id);
        assert_eq!(user.last_login, zero_instant());
        assert!(user.date_joined >= before);

        let (statement, params) = backend.executed().remove(0);
        assert_eq!(statement, "insert user");
        assert_eq!(params.len(), 10);
        assert_eq!(params[0], SqlValue::from("user1"));
        assert_eq!(params[2], SqlValue::from("one@example.org"));
        assert_eq!(params[9], SqlValue::Timestamp(zero_instant()));
    }

    #[tokio::test]
    async fn duplicate_insert_is_user_exists() {
        let (backend, users) = engine(true);
        backend.push_exec(Err(duplicate_failure()));
        let mut user = UserModel::new("user1", "one@example.org");
        let err = users.insert_user(&mut user).await.unwrap_err();
        assert!(err.is_already_exists());
        assert!(err.to_string().contains("user1"));
        assert_eq!(user.id, UserId::INVALID);
    }

    #[tokio::test]
    async fn missing_insert_id_is_unsupported() {
        let (backend, users) = engine(true);
        backend.push_exec(Ok(ExecOutcome {
            rows_affected: Some(1),
            last_insert_id: None,
        }));
        let mut user = UserModel::new("user1", "one@example.org");
        let err = users.insert_user(&mut user).await.unwrap_err();
        assert!(matches!(err, StoreError::Unsupported("last insert id")));
    }

    #[tokio::test]
    async fn partial_update_binds_only_named_fields() {
        let (backend, users) = engine(true);
        let mut user = UserModel::new("renamed", "new@example.org");
        user.is_staff = true;

        users
            .update_user(UserId(5), &user, &[UserField::IsStaff, UserField::EMail])
            .await
            .unwrap();

        let (statement, params) = backend.executed().remove(0);
        assert_eq!(statement, "update IsStaff,EMail");
        assert_eq!(
            params,
            vec![
                SqlValue::Bool(true),
                SqlValue::from("new@example.org"),
                SqlValue::Integer(5)
            ]
        );
    }

    #[tokio::test]
    async fn full_update_when_provider_ignores_subsets() {
        let (backend, users) = engine(false);
        let user = UserModel::new("u", "u@example.org");
        users.update_user(UserId(2), &user, &[UserField::Username]).await.unwrap();

        let (statement, params) = backend.executed().remove(0);
        assert_eq!(statement, "update all");
        assert_eq!(params.len(), 11);
        assert_eq!(params[10], SqlValue::Integer(2));
    }

    #[tokio::test]
    async fn empty_field_list_updates_everything() {
        let (backend, users) = engine(true);
        let user = UserModel::new("u", "u@example.org");
        users.update_user(UserId(2), &user, &[]).await.unwrap();
        assert_eq!(backend.executed()[0].0, "update all");
    }

    #[tokio::test]
    async fn unknown_field_name_fails_before_any_statement() {
        let (backend, users) = engine(true);
        let user = UserModel::new("u", "u@example.org");
        let err = users
            .update_user_by_names(UserId(2), &user, &["email", "nickname"])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(ref name) if name == "nickname"));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn duplicate_update_is_ambiguous() {
        let (backend, users) = engine(true);
        backend.push_exec(Err(duplicate_failure()));
        let user = UserModel::new("u", "taken@example.org");
        let err = users
            .update_user(UserId(2), &user, &[UserField::EMail])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousUpdate(_)));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_succeed() {
        let (backend, users) = engine(true);
        for _ in 0..2 {
            backend.push_exec(Ok(ExecOutcome {
                rows_affected: Some(0),
                last_insert_id: None,
            }));
        }

        let user = UserModel::new("u", "u@example.org");
        users.update_user(UserId(99), &user, &[]).await.unwrap();
        users.delete_user(UserId(99)).await.unwrap();
        assert_eq!(backend.executed()[1], ("delete user".to_string(), vec![SqlValue::Integer(99)]));
    }

    #[tokio::test]
    async fn init_runs_provider_statements() {
        let (backend, users) = engine(true);
        users.init_users().await.unwrap();
        assert_eq!(backend.tx_statements(), vec!["CREATE users"]);
    }
}
