// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording backend, bridge and query providers for engine unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{
    Backend, BatchFailure, DriverBridge, DriverError, ExecOutcome, Row, ScanKind, SessionQueries,
    SqlValue, StoreError, UserField, UserQueries,
};

#[derive(Default)]
struct MockState {
    tx_statements: Vec<String>,
    tx_events: Vec<String>,
    executed: Vec<(String, Vec<SqlValue>)>,
    queried: Vec<(String, Vec<SqlValue>, Vec<ScanKind>)>,
    exec_results: VecDeque<Result<ExecOutcome, DriverError>>,
    rows: VecDeque<Result<Row, DriverError>>,
}

/// Backend that records every call and replays scripted results.
///
/// Unscripted executes report one affected row and insert id 1; unscripted
/// queries return [`DriverError::NoRows`].
#[derive(Default)]
pub(crate) struct MockBackend {
    state: Arc<Mutex<MockState>>,
    fail_tx_statement: Option<String>,
    fail_rollback: bool,
    fail_commit: bool,
}

pub(crate) fn driver_failure(msg: impl Into<String>) -> DriverError {
    DriverError::failure(io::Error::other(msg.into()))
}

/// A failure the mock bridge classifies as a uniqueness violation.
pub(crate) fn duplicate_failure() -> DriverError {
    DriverError::failure(io::Error::new(io::ErrorKind::AlreadyExists, "duplicate key"))
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_tx_statement(mut self, statement: &str) -> Self {
        self.fail_tx_statement = Some(statement.to_string());
        self
    }

    pub(crate) fn fail_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub(crate) fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub(crate) fn push_exec(&self, result: Result<ExecOutcome, DriverError>) {
        self.state.lock().unwrap().exec_results.push_back(result);
    }

    pub(crate) fn push_row(&self, result: Result<Row, DriverError>) {
        self.state.lock().unwrap().rows.push_back(result);
    }

    pub(crate) fn tx_statements(&self) -> Vec<String> {
        self.state.lock().unwrap().tx_statements.clone()
    }

    pub(crate) fn tx_events(&self) -> Vec<String> {
        self.state.lock().unwrap().tx_events.clone()
    }

    pub(crate) fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.state.lock().unwrap().executed.clone()
    }

    pub(crate) fn queried(&self) -> Vec<(String, Vec<SqlValue>, Vec<ScanKind>)> {
        self.state.lock().unwrap().queried.clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn run_batch(&self, statements: &[String]) -> Result<(), BatchFailure> {
        let mut state = self.state.lock().unwrap();
        state.tx_events.push("begin".into());
        for statement in statements {
            state.tx_statements.push(statement.clone());
            if self.fail_tx_statement.as_deref() == Some(statement.as_str()) {
                let initial = driver_failure(format!("{statement} failed"));
                state.tx_events.push("rollback".into());
                if self.fail_rollback {
                    return Err(BatchFailure::Rollback {
                        initial,
                        rollback: driver_failure("rollback failed"),
                    });
                }
                return Err(BatchFailure::Statement(initial));
            }
        }
        state.tx_events.push("commit".into());
        if self.fail_commit {
            return Err(BatchFailure::Commit(driver_failure("commit failed")));
        }
        Ok(())
    }

    async fn execute(&self, statement: &str, params: Vec<SqlValue>) -> Result<ExecOutcome, DriverError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push((statement.to_string(), params));
        state.exec_results.pop_front().unwrap_or(Ok(ExecOutcome {
            rows_affected: Some(1),
            last_insert_id: Some(1),
        }))
    }

    async fn query_row(
        &self,
        statement: &str,
        params: Vec<SqlValue>,
        kinds: &[ScanKind],
    ) -> Result<Row, DriverError> {
        let mut state = self.state.lock().unwrap();
        state
            .queried
            .push((statement.to_string(), params, kinds.to_vec()));
        state.rows.pop_front().unwrap_or(Err(DriverError::NoRows))
    }
}

/// Bridge that passes timestamps through as [`SqlValue::Timestamp`].
pub(crate) struct MockBridge;

impl DriverBridge for MockBridge {
    fn timestamp_scan_kind(&self) -> ScanKind {
        ScanKind::Timestamp
    }

    fn timestamp_from_sql(&self, value: SqlValue) -> Result<DateTime<Utc>, StoreError> {
        match value {
            SqlValue::Timestamp(t) => Ok(t),
            other => Err(StoreError::TypeMismatch {
                expected: "timestamp",
                found: other.type_name().to_string(),
            }),
        }
    }

    fn timestamp_to_sql(&self, instant: DateTime<Utc>) -> SqlValue {
        SqlValue::Timestamp(instant)
    }

    fn is_duplicate_insert(&self, err: &DriverError) -> bool {
        err.downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::AlreadyExists)
    }
}

pub(crate) struct MockUserQueries {
    pub(crate) partial: bool,
    init: Vec<String>,
}

impl MockUserQueries {
    pub(crate) fn new(partial: bool) -> Self {
        Self {
            partial,
            init: vec!["CREATE users".to_string()],
        }
    }
}

impl UserQueries for MockUserQueries {
    fn init_statements(&self) -> &[String] {
        &self.init
    }

    fn get_user(&self) -> &str {
        "user by id"
    }

    fn get_user_by_name(&self) -> &str {
        "user by name"
    }

    fn get_user_by_email(&self) -> &str {
        "user by email"
    }

    fn insert_user(&self) -> &str {
        "insert user"
    }

    fn update_user(&self, fields: Option<&[UserField]>) -> String {
        match fields {
            Some(fields) => {
                let names: Vec<String> = fields.iter().map(ToString::to_string).collect();
                format!("update {}", names.join(","))
            }
            None => "update all".to_string(),
        }
    }

    fn supports_user_fields(&self) -> bool {
        self.partial
    }

    fn delete_user(&self) -> &str {
        "delete user"
    }
}

pub(crate) struct MockSessionQueries {
    init: Vec<String>,
}

impl MockSessionQueries {
    pub(crate) fn new() -> Self {
        Self {
            init: vec!["CREATE sessions".to_string(), "CREATE INDEX expiry".to_string()],
        }
    }
}

impl SessionQueries for MockSessionQueries {
    fn init_statements(&self) -> &[String] {
        &self.init
    }

    fn get_session(&self) -> &str {
        "session by key"
    }

    fn insert_session(&self) -> &str {
        "insert session"
    }

    fn delete_session(&self) -> &str {
        "delete session"
    }

    fn delete_expired_before(&self) -> &str {
        "delete expired"
    }

    fn delete_for_user(&self) -> &str {
        "delete for user"
    }
}
