// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statements for the user table.

use keyward_core::template::USERS_TABLE_NAME;
use keyward_core::{TemplateReplacer, UserColumns, UserField, UserQueries};

fn column_type(field: UserField) -> &'static str {
    match field {
        UserField::Username => "TEXT NOT NULL UNIQUE",
        UserField::EMail => "TEXT NOT NULL $EMAIL_UNIQUE$",
        UserField::Password | UserField::FirstName | UserField::LastName => "TEXT NOT NULL",
        UserField::IsSuperUser | UserField::IsStaff | UserField::IsActive => "INTEGER NOT NULL",
        UserField::DateJoined | UserField::LastLogin => "TEXT NOT NULL",
    }
}

/// User statements for one table layout.
#[derive(Debug, Clone)]
pub struct SqliteUserQueries {
    columns: UserColumns,
    table: String,
    init: Vec<String>,
    get_user: String,
    get_user_by_name: String,
    get_user_by_email: String,
    insert_user: String,
    update_all: String,
    delete_user: String,
}

impl SqliteUserQueries {
    /// Resolve statements for `columns` with the table name and email
    /// constraint taken from `replacer`.
    pub fn new(replacer: &TemplateReplacer, columns: UserColumns) -> Self {
        let table = replacer.apply(USERS_TABLE_NAME);
        let id = columns.id().to_string();

        let definitions: Vec<String> = UserField::ALL
            .iter()
            .map(|&f| format!("    {} {}", columns.column(f), column_type(f)))
            .collect();
        let create = replacer.apply(&format!(
            "CREATE TABLE IF NOT EXISTS {USERS_TABLE_NAME} (\n    {id} INTEGER PRIMARY KEY AUTOINCREMENT,\n{}\n)",
            definitions.join(",\n")
        ));

        let names: Vec<&str> = UserField::ALL.iter().map(|&f| columns.column(f)).collect();
        let select = format!("SELECT {id}, {} FROM {table}", names.join(", "));
        let placeholders = vec!["?"; names.len()].join(", ");

        let mut queries = Self {
            init: vec![create],
            get_user: format!("{select} WHERE {id} = ?"),
            get_user_by_name: format!("{select} WHERE {} = ?", columns.column(UserField::Username)),
            get_user_by_email: format!("{select} WHERE {} = ?", columns.column(UserField::EMail)),
            insert_user: format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders})",
                names.join(", ")
            ),
            update_all: String::new(),
            delete_user: format!("DELETE FROM {table} WHERE {id} = ?"),
            columns,
            table,
        };
        queries.update_all = queries.build_update(&UserField::ALL);
        queries
    }

    /// Statements for the default column names.
    pub fn with_default_columns(replacer: &TemplateReplacer) -> Self {
        Self::new(replacer, UserColumns::default())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn build_update(&self, fields: &[UserField]) -> String {
        let assignments: Vec<String> = fields
            .iter()
            .map(|&f| format!("{} = ?", self.columns.column(f)))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table,
            assignments.join(", "),
            self.columns.id()
        )
    }
}

impl UserQueries for SqliteUserQueries {
    fn init_statements(&self) -> &[String] {
        &self.init
    }

    fn get_user(&self) -> &str {
        &self.get_user
    }

    fn get_user_by_name(&self) -> &str {
        &self.get_user_by_name
    }

    fn get_user_by_email(&self) -> &str {
        &self.get_user_by_email
    }

    fn insert_user(&self) -> &str {
        &self.insert_user
    }

    fn update_user(&self, fields: Option<&[UserField]>) -> String {
        match fields {
            Some(fields) if !fields.is_empty() => self.build_update(fields),
            _ => self.update_all.clone(),
        }
    }

    fn supports_user_fields(&self) -> bool {
        true
    }

    fn delete_user(&self) -> &str {
        &self.delete_user
    }
}
