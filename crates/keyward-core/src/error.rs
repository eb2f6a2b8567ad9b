// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy shared by every storage engine.
//!
//! Callers branch on [`StoreError`] variants and never need to inspect
//! driver-specific errors. Backend failures only become typed conditions when a
//! bridge classifier recognizes them; everything else is carried unchanged in
//! [`StoreError::Driver`].

use thiserror::Error;

use crate::template::TemplateError;
use crate::types::UserId;

/// A failure reported by a backing store while executing a statement.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A single-row query matched nothing.
    #[error("query returned no rows")]
    NoRows,

    /// Any other driver failure, kept intact for bridge classification.
    #[error(transparent)]
    Failure(Box<dyn std::error::Error + Send + Sync>),
}

impl DriverError {
    /// Wrap an arbitrary driver error.
    pub fn failure<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failure(Box::new(err))
    }

    /// Attempt to view the wrapped driver error as a concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::NoRows => None,
            Self::Failure(source) => source.downcast_ref::<E>(),
        }
    }
}

/// The key a failed user lookup was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(UserId),
    Username(String),
    Email(String),
}

impl std::fmt::Display for UserLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Username(name) => write!(f, "username `{name}`"),
            Self::Email(email) => write!(f, "email `{email}`"),
        }
    }
}

/// The primary error type returned by user and session storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user matched the lookup key.
    #[error("no user with {0}")]
    NoSuchUser(UserLookup),

    /// No session matched the key.
    #[error("no session with key `{key}`")]
    NoSuchSession { key: String },

    /// Inserting a user violated a uniqueness constraint.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// Inserting a session collided with an existing key.
    #[error("session with key `{key}` already exists")]
    SessionExists { key: String },

    /// An update would violate a uniqueness constraint.
    #[error("ambiguous user credentials: {0}")]
    AmbiguousUpdate(String),

    /// The backend cannot report a value the operation needs.
    ///
    /// The underlying statement has already taken effect.
    #[error("operation not supported by backend: {0}")]
    Unsupported(&'static str),

    /// A transaction step failed and undoing it failed as well.
    #[error("statement failed: {initial}, unable to rollback: {rollback}")]
    Rollback {
        initial: Box<StoreError>,
        rollback: Box<StoreError>,
    },

    /// The bounded session insert retry saw a collision on every attempt.
    #[error("session insert gave up after {} key collisions", collisions.len())]
    RetryExhausted { collisions: Vec<StoreError> },

    /// A partial update named a field that is not an updatable user field.
    #[error("unknown user field `{0}`")]
    UnknownField(String),

    /// A scanned value had the wrong dynamic type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// The system random source could not produce a session key.
    #[error("session key generation failed: {0}")]
    KeyGeneration(String),

    /// A configured table name is not a plain SQL identifier.
    #[error("`{0}` is not a valid table name")]
    InvalidTableName(String),

    /// A storage handle was used before it was opened.
    #[error("storage not initialized, call initialize() first")]
    NotInitialized,

    /// A storage handle was opened twice.
    #[error("storage already initialized")]
    AlreadyInitialized,

    /// Committing a transaction failed.
    #[error("commit failed: {0}")]
    Commit(DriverError),

    /// Query template configuration failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// An unclassified backend failure, passed through unchanged.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl StoreError {
    /// True for the user and session not-found conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchUser(_) | Self::NoSuchSession { .. })
    }

    /// True for the user and session already-exists conditions.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::UserExists(_) | Self::SessionExists { .. })
    }
}
