// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field validators for user models and clear-text password policies.
//!
//! Model validators inspect what will be stored, so they see the password
//! hash. Check clear-text passwords with a [`PasswordPolicy`] before hashing.
//! Length limits count characters, not bytes, and match the default schema.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::UserModel;

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_HASH_MAX_LEN: usize = 270;
pub const EMAIL_MAX_LEN: usize = 254;
pub const FIRST_NAME_MAX_LEN: usize = 50;
pub const LAST_NAME_MAX_LEN: usize = 150;

/// Characters accepted by [`CharClass::Special`].
pub const SPECIAL_CHARACTERS: &str = "~!@#$%^&*()+=_-{}[]\\|:;?/<>,";

static EMAIL_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap());

// A letter first; afterwards letters and digits, where `_` or `.` may appear
// only between two of them.
static USERNAME_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]([a-zA-Z0-9]|[_.][a-zA-Z0-9])*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no username given")]
    EmptyUsername,
    #[error("no email given")]
    EmptyEmail,
    #[error("no password set")]
    EmptyPassword,
    #[error("invalid syntax in email")]
    InvalidEmailSyntax,
    #[error("invalid username syntax")]
    InvalidUsernameSyntax,
    #[error("invalid first name")]
    InvalidFirstNameSyntax,
    #[error("invalid last name")]
    InvalidLastNameSyntax,
    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// A check run against a whole user model.
pub type UserVerifier = fn(&UserModel) -> Result<(), ValidationError>;

pub fn verify_name_exists(user: &UserModel) -> Result<(), ValidationError> {
    if user.username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}

pub fn verify_email_exists(user: &UserModel) -> Result<(), ValidationError> {
    if user.email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    Ok(())
}

pub fn verify_password_exists(user: &UserModel) -> Result<(), ValidationError> {
    if user.password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Syntax only; length is checked separately.
pub fn check_email_syntax(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmailSyntax)
    }
}

pub fn verify_email_syntax(user: &UserModel) -> Result<(), ValidationError> {
    check_email_syntax(&user.email)
}

pub fn check_username_syntax(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RX.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsernameSyntax)
    }
}

fn all_letters(name: &str) -> bool {
    name.chars().all(char::is_alphabetic)
}

pub fn check_first_name_syntax(name: &str) -> Result<(), ValidationError> {
    if all_letters(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFirstNameSyntax)
    }
}

pub fn check_last_name_syntax(name: &str) -> Result<(), ValidationError> {
    if all_letters(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLastNameSyntax)
    }
}

fn check_max_len(value: &str, field: &'static str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn check_username_max_len(username: &str) -> Result<(), ValidationError> {
    check_max_len(username, "username", USERNAME_MAX_LEN)
}

pub fn check_password_hash_max_len(hash: &str) -> Result<(), ValidationError> {
    check_max_len(hash, "password", PASSWORD_HASH_MAX_LEN)
}

pub fn check_email_max_len(email: &str) -> Result<(), ValidationError> {
    check_max_len(email, "email", EMAIL_MAX_LEN)
}

pub fn check_first_name_max_len(name: &str) -> Result<(), ValidationError> {
    check_max_len(name, "first name", FIRST_NAME_MAX_LEN)
}

pub fn check_last_name_max_len(name: &str) -> Result<(), ValidationError> {
    check_max_len(name, "last name", LAST_NAME_MAX_LEN)
}

/// Check every length limit of the default schema, stopping at the first failure.
pub fn verify_standard_max_lens(user: &UserModel) -> Result<(), ValidationError> {
    check_username_max_len(&user.username)?;
    check_password_hash_max_len(&user.password)?;
    check_email_max_len(&user.email)?;
    check_first_name_max_len(&user.first_name)?;
    check_last_name_max_len(&user.last_name)
}

/// Run several verifiers in order, returning the first failure.
pub fn verify_all(user: &UserModel, verifiers: &[UserVerifier]) -> Result<(), ValidationError> {
    verifiers.iter().try_for_each(|verify| verify(user))
}

/// A class of characters a password may be required to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Lower,
    Upper,
    Digit,
    Special,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Lower => c.is_ascii_lowercase(),
            Self::Upper => c.is_ascii_uppercase(),
            Self::Digit => c.is_ascii_digit(),
            Self::Special => SPECIAL_CHARACTERS.contains(c),
        }
    }
}

/// How many of `classes` have at least one character in `s`.
pub fn count_classes(classes: &[CharClass], s: &str) -> usize {
    classes
        .iter()
        .filter(|class| s.chars().any(|c| class.contains(c)))
        .count()
}

/// Requirements for a clear-text password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub required: Vec<CharClass>,
}

impl PasswordPolicy {
    pub fn with_len(min_len: Option<usize>, max_len: Option<usize>) -> Self {
        Self {
            min_len,
            max_len,
            required: Vec::new(),
        }
    }

    pub fn requiring(mut self, classes: &[CharClass]) -> Self {
        self.required.extend_from_slice(classes);
        self
    }

    pub fn accepts(&self, password: &str) -> bool {
        let len = password.chars().count();
        if self.min_len.is_some_and(|min| len < min) {
            return false;
        }
        if self.max_len.is_some_and(|max| len > max) {
            return false;
        }
        count_classes(&self.required, password) == self.required.len()
    }
}
