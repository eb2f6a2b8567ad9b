// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection handle and the [`Backend`] implementation on top of it.
//!
//! Every statement runs on tokio-rusqlite's single background thread. A
//! transactional batch runs inside one call on that thread, so no other
//! statement can land inside it.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::{Backend, BatchFailure, DriverError, ExecOutcome, Row, ScanKind, SqlValue};
use rusqlite::params_from_iter;
use rusqlite::types::{Type, Value, ValueRef};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::bridge::format_timestamp;

/// Convert a tokio-rusqlite error into a [`DriverError`].
///
/// The rusqlite error itself is boxed, not the wrapper, so bridges can
/// downcast to [`rusqlite::Error`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> DriverError {
    match e {
        tokio_rusqlite::Error::Error(rusqlite::Error::QueryReturnedNoRows) => DriverError::NoRows,
        tokio_rusqlite::Error::Error(inner) => DriverError::failure(inner),
        other => DriverError::failure(other),
    }
}

/// An open SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path`.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, DriverError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(DriverError::failure)?;
        }
        let conn = Connection::open(&path).await.map_err(DriverError::failure)?;
        let db = Self { conn };
        db.apply_pragmas(wal_mode).await?;
        debug!(path = %path.display(), wal_mode, "database opened");
        Ok(db)
    }

    /// A private in-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(DriverError::failure)?;
        let db = Self { conn };
        db.apply_pragmas(false).await?;
        Ok(db)
    }

    async fn apply_pragmas(&self, wal_mode: bool) -> Result<(), DriverError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `SELECT 1` to confirm the connection is alive.
    pub async fn ping(&self) -> Result<(), DriverError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Fold the write-ahead log back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), DriverError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

fn to_sqlite(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(v),
        SqlValue::Real(v) => Value::Real(v),
        SqlValue::Bool(v) => Value::Integer(i64::from(v)),
        SqlValue::Text(v) => Value::Text(v),
        SqlValue::Blob(v) => Value::Blob(v),
        SqlValue::Timestamp(t) => Value::Text(format_timestamp(t)),
    }
}

fn scan_column(row: &rusqlite::Row<'_>, idx: usize, kind: ScanKind) -> rusqlite::Result<SqlValue> {
    if let ValueRef::Null = row.get_ref(idx)? {
        return Ok(SqlValue::Null);
    }
    Ok(match kind {
        ScanKind::Integer => SqlValue::Integer(row.get(idx)?),
        ScanKind::Real => SqlValue::Real(row.get(idx)?),
        ScanKind::Bool => SqlValue::Bool(row.get(idx)?),
        ScanKind::Text => SqlValue::Text(row.get(idx)?),
        ScanKind::Blob => SqlValue::Blob(row.get(idx)?),
        ScanKind::Timestamp => {
            let text: String = row.get(idx)?;
            let instant = DateTime::parse_from_rfc3339(&text)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
            SqlValue::Timestamp(instant.with_timezone(&Utc))
        }
    })
}

#[async_trait]
impl Backend for Database {
    async fn run_batch(&self, statements: &[String]) -> Result<(), BatchFailure> {
        let statements = statements.to_vec();
        self.conn
            .call(move |conn| -> Result<Result<(), BatchFailure>, rusqlite::Error> {
                let tx = match conn.transaction() {
                    Ok(tx) => tx,
                    Err(e) => return Ok(Err(BatchFailure::Begin(DriverError::failure(e)))),
                };
                for statement in &statements {
                    if let Err(e) = tx.execute_batch(statement) {
                        let initial = DriverError::failure(e);
                        return Ok(Err(match tx.rollback() {
                            Ok(()) => BatchFailure::Statement(initial),
                            Err(rollback) => BatchFailure::Rollback {
                                initial,
                                rollback: DriverError::failure(rollback),
                            },
                        }));
                    }
                }
                Ok(tx.commit().map_err(|e| BatchFailure::Commit(DriverError::failure(e))))
            })
            .await
            .map_err(|e| BatchFailure::Begin(map_tr_err(e)))?
    }

    async fn execute(&self, statement: &str, params: Vec<SqlValue>) -> Result<ExecOutcome, DriverError> {
        let statement = statement.to_string();
        let values: Vec<Value> = params.into_iter().map(to_sqlite).collect();
        self.conn
            .call(move |conn| -> Result<ExecOutcome, rusqlite::Error> {
                let mut stmt = conn.prepare_cached(&statement)?;
                let changed = stmt.execute(params_from_iter(values))?;
                Ok(ExecOutcome {
                    rows_affected: Some(changed as u64),
                    last_insert_id: Some(conn.last_insert_rowid()),
                })
            })
            .await
            .map_err(map_tr_err)
    }

    async fn query_row(
        &self,
        statement: &str,
        params: Vec<SqlValue>,
        kinds: &[ScanKind],
    ) -> Result<Row, DriverError> {
        let statement = statement.to_string();
        let values: Vec<Value> = params.into_iter().map(to_sqlite).collect();
        let kinds = kinds.to_vec();
        self.conn
            .call(move |conn| -> Result<Row, rusqlite::Error> {
                let mut stmt = conn.prepare_cached(&statement)?;
                stmt.query_row(params_from_iter(values), |row| {
                    kinds
                        .iter()
                        .enumerate()
                        .map(|(idx, kind)| scan_column(row, idx, *kind))
                        .collect::<rusqlite::Result<Vec<_>>>()
                        .map(Row::new)
                })
            })
            .await
            .map_err(map_tr_err)
    }
}
