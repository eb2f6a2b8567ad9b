// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Updatable user fields and their fixed field-to-column table.
//!
//! Partial updates name fields as strings. They are resolved once, up front,
//! into [`UserField`] values; each field carries an accessor, a flag telling the
//! engine to route the value through the driver bridge, and a default column.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use crate::error::StoreError;
use crate::types::UserModel;
use crate::value::SqlValue;

/// One of the ten non-ID user fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum UserField {
    Username,
    Password,
    EMail,
    FirstName,
    LastName,
    IsSuperUser,
    IsStaff,
    IsActive,
    DateJoined,
    LastLogin,
}

/// A field's value as read from a model, before dialect conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Plain(SqlValue),
    Timestamp(DateTime<Utc>),
}

/// Row of the fixed lookup table.
pub struct FieldSpec {
    pub field: UserField,
    pub column: &'static str,
    pub timestamp: bool,
    get: fn(&UserModel) -> FieldValue,
    set: fn(&mut UserModel, &UserModel),
}

/// The lookup table, in canonical parameter order.
static FIELD_TABLE: [FieldSpec; 10] = [
    FieldSpec {
        field: UserField::Username,
        column: "username",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Text(u.username.clone())),
        set: |dst, src| dst.username.clone_from(&src.username),
    },
    FieldSpec {
        field: UserField::Password,
        column: "password",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Text(u.password.clone())),
        set: |dst, src| dst.password.clone_from(&src.password),
    },
    FieldSpec {
        field: UserField::EMail,
        column: "email",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Text(u.email.clone())),
        set: |dst, src| dst.email.clone_from(&src.email),
    },
    FieldSpec {
        field: UserField::FirstName,
        column: "first_name",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Text(u.first_name.clone())),
        set: |dst, src| dst.first_name.clone_from(&src.first_name),
    },
    FieldSpec {
        field: UserField::LastName,
        column: "last_name",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Text(u.last_name.clone())),
        set: |dst, src| dst.last_name.clone_from(&src.last_name),
    },
    FieldSpec {
        field: UserField::IsSuperUser,
        column: "is_superuser",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Bool(u.is_superuser)),
        set: |dst, src| dst.is_superuser = src.is_superuser,
    },
    FieldSpec {
        field: UserField::IsStaff,
        column: "is_staff",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Bool(u.is_staff)),
        set: |dst, src| dst.is_staff = src.is_staff,
    },
    FieldSpec {
        field: UserField::IsActive,
        column: "is_active",
        timestamp: false,
        get: |u| FieldValue::Plain(SqlValue::Bool(u.is_active)),
        set: |dst, src| dst.is_active = src.is_active,
    },
    FieldSpec {
        field: UserField::DateJoined,
        column: "date_joined",
        timestamp: true,
        get: |u| FieldValue::Timestamp(u.date_joined),
        set: |dst, src| dst.date_joined = src.date_joined,
    },
    FieldSpec {
        field: UserField::LastLogin,
        column: "last_login",
        timestamp: true,
        get: |u| FieldValue::Timestamp(u.last_login),
        set: |dst, src| dst.last_login = src.last_login,
    },
];

impl UserField {
    /// All fields in canonical order: the insert and full-update parameter order.
    pub const ALL: [UserField; 10] = [
        UserField::Username,
        UserField::Password,
        UserField::EMail,
        UserField::FirstName,
        UserField::LastName,
        UserField::IsSuperUser,
        UserField::IsStaff,
        UserField::IsActive,
        UserField::DateJoined,
        UserField::LastLogin,
    ];

    fn spec(self) -> &'static FieldSpec {
        // FIELD_TABLE is laid out in the same order as ALL.
        &FIELD_TABLE[self as usize]
    }

    /// Default column name for this field.
    pub fn default_column(self) -> &'static str {
        self.spec().column
    }

    /// Whether values of this field must pass through the driver bridge.
    pub fn is_timestamp(self) -> bool {
        self.spec().timestamp
    }

    /// Current value of this field on `user`.
    pub fn value_of(self, user: &UserModel) -> FieldValue {
        (self.spec().get)(user)
    }

    /// Copy this field from `src` into `dst`.
    pub fn copy_into(self, dst: &mut UserModel, src: &UserModel) {
        (self.spec().set)(dst, src)
    }

    /// Resolve a list of field names, rejecting anything that is not an
    /// updatable field.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<UserField>, StoreError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                UserField::from_str(name).map_err(|_| StoreError::UnknownField(name.to_string()))
            })
            .collect()
    }
}

/// Immutable field-to-column mapping handed to query providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserColumns {
    id: String,
    columns: HashMap<UserField, String>,
}

impl Default for UserColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            columns: FIELD_TABLE
                .iter()
                .map(|spec| (spec.field, spec.column.to_string()))
                .collect(),
        }
    }
}

impl UserColumns {
    /// Override the column of a single field.
    pub fn with_column(mut self, field: UserField, column: impl Into<String>) -> Self {
        self.columns.insert(field, column.into());
        self
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id = column.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn column(&self, field: UserField) -> &str {
        self.columns
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_canonical_order() {
        for (spec, field) in FIELD_TABLE.iter().zip(UserField::ALL) {
            assert_eq!(spec.field, field);
        }
    }

    #[test]
    fn names_resolve_case_insensitively() {
        let fields = UserField::parse_list(&["email", "USERNAME", "IsSuperUser", "lastlogin"]).unwrap();
        assert_eq!(
            fields,
            vec![
                UserField::EMail,
                UserField::Username,
                UserField::IsSuperUser,
                UserField::LastLogin
            ]
        );
    }

    #[test]
    fn id_and_unknown_names_are_rejected() {
        let err = UserField::parse_list(&["Username", "ID"]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(ref name) if name == "ID"));
        assert!(UserField::parse_list(&["nickname"]).is_err());
    }

    #[test]
    fn only_dates_need_timestamp_conversion() {
        let timestamps: Vec<_> = UserField::ALL
            .into_iter()
            .filter(|f| f.is_timestamp())
            .collect();
        assert_eq!(timestamps, vec![UserField::DateJoined, UserField::LastLogin]);
    }

    #[test]
    fn copy_into_touches_only_one_field() {
        let mut dst = UserModel::new("old", "old@example.org");
        let src = UserModel::new("new", "new@example.org");
        UserField::EMail.copy_into(&mut dst, &src);
        assert_eq!(dst.email, "new@example.org");
        assert_eq!(dst.username, "old");
    }

    #[test]
    fn columns_can_be_overridden() {
        let cols = UserColumns::default().with_column(UserField::EMail, "mail");
        assert_eq!(cols.column(UserField::EMail), "mail");
        assert_eq!(cols.column(UserField::Username), "username");
        assert_eq!(cols.id(), "id");
    }
}
