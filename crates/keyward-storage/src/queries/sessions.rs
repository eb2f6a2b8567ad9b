// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statements for the session table.

use keyward_core::{SessionQueries, TemplateReplacer};

const INIT: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS $SESSIONS_TABLE_NAME$ (
        session_key TEXT NOT NULL PRIMARY KEY,
        user_id INTEGER NOT NULL,
        expire_date TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS $SESSIONS_TABLE_NAME$_expire_date_idx
        ON $SESSIONS_TABLE_NAME$ (expire_date)",
];

const GET: &str =
    "SELECT session_key, user_id, expire_date FROM $SESSIONS_TABLE_NAME$ WHERE session_key = ?1";
const INSERT: &str =
    "INSERT INTO $SESSIONS_TABLE_NAME$ (session_key, user_id, expire_date) VALUES (?1, ?2, ?3)";
const DELETE: &str = "DELETE FROM $SESSIONS_TABLE_NAME$ WHERE session_key = ?1";
const DELETE_EXPIRED: &str = "DELETE FROM $SESSIONS_TABLE_NAME$ WHERE expire_date <= ?1";
const DELETE_FOR_USER: &str = "DELETE FROM $SESSIONS_TABLE_NAME$ WHERE user_id = ?1";

#[derive(Debug, Clone)]
pub struct SqliteSessionQueries {
    init: Vec<String>,
    get: String,
    insert: String,
    delete: String,
    delete_expired: String,
    delete_for_user: String,
}

impl SqliteSessionQueries {
    pub fn new(replacer: &TemplateReplacer) -> Self {
        Self {
            init: INIT.iter().map(|s| replacer.apply(s)).collect(),
            get: replacer.apply(GET),
            insert: replacer.apply(INSERT),
            delete: replacer.apply(DELETE),
            delete_expired: replacer.apply(DELETE_EXPIRED),
            delete_for_user: replacer.apply(DELETE_FOR_USER),
        }
    }
}

impl SessionQueries for SqliteSessionQueries {
    fn init_statements(&self) -> &[String] {
        &self.init
    }

    fn get_session(&self) -> &str {
        &self.get
    }

    fn insert_session(&self) -> &str {
        &self.insert
    }

    fn delete_session(&self) -> &str {
        &self.delete
    }

    fn delete_expired_before(&self) -> &str {
        &self.delete_expired
    }

    fn delete_for_user(&self) -> &str {
        &self.delete_for_user
    }
}
