// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialect-neutral statement parameters and scanned row values.

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// A parameter bound to a statement, or a column value read back from one.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Name of the variant, used in type mismatch reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// The type a backend should read a column as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Integer,
    Real,
    Bool,
    Text,
    Blob,
    Timestamp,
}

/// A single scanned row, addressed positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move the value at `idx` out of the row, leaving `Null` behind.
    pub fn take(&mut self, idx: usize) -> Result<SqlValue, StoreError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(idx)
            .ok_or_else(|| StoreError::TypeMismatch {
                expected: "column",
                found: format!("row with {len} columns"),
            })?;
        Ok(std::mem::replace(slot, SqlValue::Null))
    }

    pub fn take_i64(&mut self, idx: usize) -> Result<i64, StoreError> {
        match self.take(idx)? {
            SqlValue::Integer(v) => Ok(v),
            other => Err(mismatch("integer", &other)),
        }
    }

    pub fn take_string(&mut self, idx: usize) -> Result<String, StoreError> {
        match self.take(idx)? {
            SqlValue::Text(v) => Ok(v),
            other => Err(mismatch("text", &other)),
        }
    }

    /// Booleans may come back as integers from dialects without a bool type.
    pub fn take_bool(&mut self, idx: usize) -> Result<bool, StoreError> {
        match self.take(idx)? {
            SqlValue::Bool(v) => Ok(v),
            SqlValue::Integer(v) => Ok(v != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &SqlValue) -> StoreError {
    StoreError::TypeMismatch {
        expected,
        found: found.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_converts_and_consumes() {
        let mut row = Row::new(vec![
            SqlValue::Integer(4),
            SqlValue::Text("bob".into()),
            SqlValue::Integer(1),
        ]);
        assert_eq!(row.take_i64(0).unwrap(), 4);
        assert_eq!(row.take_string(1).unwrap(), "bob");
        assert!(row.take_bool(2).unwrap());
        assert_eq!(row.take(1).unwrap(), SqlValue::Null);
    }

    #[test]
    fn take_reports_type_mismatch() {
        let mut row = Row::new(vec![SqlValue::Text("x".into())]);
        let err = row.take_i64(0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: "integer", ref found } if found == "text"
        ));
    }

    #[test]
    fn take_out_of_range_fails() {
        let mut row = Row::default();
        assert!(row.take(0).is_err());
    }
}
