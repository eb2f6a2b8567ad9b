// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query providers: the statement text a dialect hands to the engines.
//!
//! Every statement returned here is fully resolved. Providers substitute their
//! `$NAME$` placeholders once, at construction, and then only hand out text.

use crate::fields::UserField;

/// Statements for the user table.
///
/// Lookups select, in order: id, username, password, email, first name,
/// last name, is_superuser, is_staff, is_active, date_joined, last_login, and
/// take one parameter. Insert takes the ten non-ID fields in
/// [`UserField::ALL`] order.
pub trait UserQueries: Send + Sync + 'static {
    /// Setup statements, run in order inside one transaction.
    fn init_statements(&self) -> &[String];

    fn get_user(&self) -> &str;

    fn get_user_by_name(&self) -> &str;

    fn get_user_by_email(&self) -> &str;

    fn insert_user(&self) -> &str;

    /// Update statement for `fields`, or for all fields when `None`.
    ///
    /// Parameters are the field values in the given order (canonical order
    /// for `None`) followed by the user id.
    fn update_user(&self, fields: Option<&[UserField]>) -> String;

    /// Whether [`update_user`](Self::update_user) honors a field subset.
    /// When false the engine always passes `None`.
    fn supports_user_fields(&self) -> bool;

    fn delete_user(&self) -> &str;
}

/// Statements for the session table.
///
/// Lookup selects key, user, expire date. Insert takes the same three values.
pub trait SessionQueries: Send + Sync + 'static {
    fn init_statements(&self) -> &[String];

    fn get_session(&self) -> &str;

    fn insert_session(&self) -> &str;

    fn delete_session(&self) -> &str;

    /// Delete every session whose expiry is at or before the parameter.
    fn delete_expired_before(&self) -> &str;

    fn delete_for_user(&self) -> &str;
}
