// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `$NAME$` placeholder substitution for query templates.
//!
//! Query providers write their statements once with placeholders such as
//! `$USERS_TABLE_NAME$` and resolve them with a [`TemplateReplacer`] at
//! construction. The replacer compiles every configured placeholder into one
//! Aho-Corasick automaton, so substitution is a single left-to-right pass and a
//! substituted value is never expanded again.
//!
//! Mutation requires `&mut self`. Finish configuring before sharing the
//! replacer; [`TemplateReplacer::apply`] only needs `&self`.

use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, MatchKind};
use thiserror::Error;

pub const USERS_TABLE_NAME: &str = "$USERS_TABLE_NAME$";
pub const SESSIONS_TABLE_NAME: &str = "$SESSIONS_TABLE_NAME$";
pub const EMAIL_UNIQUE: &str = "$EMAIL_UNIQUE$";

pub const DEFAULT_USERS_TABLE: &str = "auth_user";
pub const DEFAULT_SESSIONS_TABLE: &str = "auth_session";

/// Errors raised while configuring a [`TemplateReplacer`].
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template placeholder must not be empty")]
    EmptyKey,

    #[error("failed to compile template placeholders: {0}")]
    Build(#[from] aho_corasick::BuildError),
}

/// Placeholder-to-value mapping compiled into a single-pass substitution.
#[derive(Debug, Clone, Default)]
pub struct TemplateReplacer {
    entries: BTreeMap<String, String>,
    automaton: Option<AhoCorasick>,
    values: Vec<String>,
}

impl TemplateReplacer {
    /// A replacer with no entries; [`apply`](Self::apply) returns its input.
    pub fn new() -> Self {
        Self::default()
    }

    /// A replacer with the default table names and a unique email column.
    pub fn with_defaults() -> Self {
        let mut replacer = Self::new();
        replacer
            .set_many([
                (USERS_TABLE_NAME, DEFAULT_USERS_TABLE),
                (SESSIONS_TABLE_NAME, DEFAULT_SESSIONS_TABLE),
                (EMAIL_UNIQUE, "UNIQUE"),
            ])
            .expect("default placeholders are non-empty");
        replacer
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), TemplateError> {
        self.set_many([(key.into(), value.into())])
    }

    /// Insert or overwrite several entries and recompile once.
    ///
    /// Entries not mentioned are left untouched.
    pub fn set_many<I, K, V>(&mut self, pairs: I) -> Result<(), TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            let key = key.into();
            if key.is_empty() {
                return Err(TemplateError::EmptyKey);
            }
            self.entries.insert(key, value.into());
        }
        self.rebuild()
    }

    /// Copy every entry of `other` into this replacer.
    pub fn merge(&mut self, other: &TemplateReplacer) -> Result<(), TemplateError> {
        self.set_many(other.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Remove an entry. Missing keys are ignored.
    pub fn delete(&mut self, key: &str) -> Result<(), TemplateError> {
        self.delete_many([key])
    }

    pub fn delete_many<'a, I>(&mut self, keys: I) -> Result<(), TemplateError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            self.entries.remove(key);
        }
        self.rebuild()
    }

    /// Replace every configured placeholder in `template` in one pass.
    pub fn apply(&self, template: &str) -> String {
        match &self.automaton {
            Some(automaton) => automaton.replace_all(template, &self.values),
            None => template.to_string(),
        }
    }

    fn rebuild(&mut self) -> Result<(), TemplateError> {
        if self.entries.is_empty() {
            self.automaton = None;
            self.values.clear();
            return Ok(());
        }
        // Leftmost-longest makes overlapping placeholders resolve the same way
        // regardless of insertion order.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(self.entries.keys())?;
        self.values = self.entries.values().cloned().collect();
        self.automaton = Some(automaton);
        Ok(())
    }
}
