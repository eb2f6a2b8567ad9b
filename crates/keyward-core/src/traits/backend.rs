// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backing store contract consumed by the SQL engines.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::DriverError;
use crate::value::{Row, ScanKind, SqlValue};

/// What an executed statement reports back.
///
/// Either count may be missing when the driver cannot produce it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: Option<u64>,
    pub last_insert_id: Option<i64>,
}

/// A database connection able to run parameterized statements.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Run `statements` in order inside one transaction.
    ///
    /// Nothing else may run on the connection until the transaction commits or
    /// rolls back. The first failing statement stops the batch and triggers a
    /// rollback.
    async fn run_batch(&self, statements: &[String]) -> Result<(), BatchFailure>;

    /// Execute a statement that returns no rows.
    async fn execute(&self, statement: &str, params: Vec<SqlValue>) -> Result<ExecOutcome, DriverError>;

    /// Run a query expected to return one row, scanning each column as the
    /// matching entry of `kinds`. An empty result is [`DriverError::NoRows`].
    async fn query_row(
        &self,
        statement: &str,
        params: Vec<SqlValue>,
        kinds: &[ScanKind],
    ) -> Result<Row, DriverError>;
}

/// Why a transactional batch did not commit.
#[derive(Debug, Error)]
pub enum BatchFailure {
    /// The transaction could not be started.
    #[error("begin failed: {0}")]
    Begin(DriverError),

    /// A statement failed and the transaction was rolled back.
    #[error(transparent)]
    Statement(DriverError),

    /// A statement failed and the rollback failed as well.
    #[error("statement failed: {initial}, unable to rollback: {rollback}")]
    Rollback {
        initial: DriverError,
        rollback: DriverError,
    },

    /// Every statement ran but the commit failed.
    #[error("commit failed: {0}")]
    Commit(DriverError),
}
