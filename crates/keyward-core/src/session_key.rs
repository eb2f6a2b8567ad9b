// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session key generation and the bounded collision retry around session insert.
//!
//! Keys are 29 bytes from the system CSPRNG encoded as unpadded URL-safe base64,
//! which always yields 39 characters (232 bits). Collisions are not expected;
//! the retry helper exists so a caller never has to handle one by hand.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::traits::SessionStorage;
use crate::types::SessionEntry;

/// Number of random bytes in a session key.
pub const SESSION_KEY_BYTES: usize = 29;

/// Length of an encoded session key.
pub const SESSION_KEY_LEN: usize = 39;

/// Generate a new cryptographically secure session key.
pub fn generate_session_key() -> Result<String, StoreError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; SESSION_KEY_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| StoreError::KeyGeneration("system random source unavailable".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Insert `entry`, replacing its key and retrying when the key collides.
///
/// At most `attempts` inserts are made. Every collision is kept and returned in
/// [`StoreError::RetryExhausted`] if all attempts collide. Any other failure,
/// including a failure to generate a replacement key, returns immediately.
/// On success `entry.key` holds the key that was stored.
pub async fn insert_session_with_retry<S>(
    store: &S,
    entry: &mut SessionEntry,
    attempts: usize,
) -> Result<(), StoreError>
where
    S: SessionStorage + ?Sized,
{
    let mut collisions = Vec::new();
    for attempt in 1..=attempts {
        match store.insert_session(entry).await {
            Ok(()) => {
                debug!(attempt, "session inserted");
                return Ok(());
            }
            Err(err @ StoreError::SessionExists { .. }) => {
                warn!(attempt, "session key collision, generating a new key");
                collisions.push(err);
                if attempt < attempts {
                    entry.key = generate_session_key()?;
                }
            }
            Err(err) => return Err(err),
        }
    }
    Err(StoreError::RetryExhausted { collisions })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tracing_test::traced_test;

    use super::*;
    use crate::types::UserId;

    /// Rejects the first `collide` inserts as duplicates, then fails or succeeds.
    struct ScriptedSessions {
        collide: usize,
        then_fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedSessions {
        fn new(collide: usize, then_fail: bool) -> Self {
            Self {
                collide,
                then_fail,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn keys(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionStorage for ScriptedSessions {
        async fn init_sessions(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn insert_session(&self, session: &SessionEntry) -> Result<(), StoreError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(session.key.clone());
            if seen.len() <= self.collide {
                return Err(StoreError::SessionExists {
                    key: session.key.clone(),
                });
            }
            if self.then_fail {
                return Err(StoreError::Unsupported("scripted failure"));
            }
            Ok(())
        }

        async fn get_session(&self, key: &str) -> Result<SessionEntry, StoreError> {
            Err(StoreError::NoSuchSession { key: key.to_string() })
        }

        async fn delete_session(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn clean_up(&self, _reference: DateTime<Utc>) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn delete_for_user(&self, _user: UserId) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    fn entry() -> SessionEntry {
        SessionEntry::new("A".repeat(SESSION_KEY_LEN), UserId(1), Utc::now())
    }

    #[test]
    fn keys_are_url_safe_and_fixed_length() {
        let mut seen = HashSet::new();
        for _ in 0..64 {
            let key = generate_session_key().unwrap();
            assert_eq!(key.len(), SESSION_KEY_LEN);
            assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            assert!(seen.insert(key));
        }
    }

    #[tokio::test]
    async fn first_attempt_success_keeps_key() {
        let store = ScriptedSessions::new(0, false);
        let mut e = entry();
        insert_session_with_retry(&store, &mut e, 3).await.unwrap();
        assert_eq!(store.keys(), vec!["A".repeat(SESSION_KEY_LEN)]);
        assert_eq!(e.key, "A".repeat(SESSION_KEY_LEN));
    }

    #[tokio::test]
    #[traced_test]
    async fn collision_regenerates_key_and_retries() {
        let store = ScriptedSessions::new(2, false);
        let mut e = entry();
        insert_session_with_retry(&store, &mut e, 3).await.unwrap();

        let keys = store.keys();
        assert_eq!(keys.len(), 3);
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_eq!(e.key, keys[2]);
        assert!(logs_contain("session key collision"));
    }

    #[tokio::test]
    async fn exhausted_attempts_report_every_collision() {
        let store = ScriptedSessions::new(10, false);
        let mut e = entry();
        let err = insert_session_with_retry(&store, &mut e, 4).await.unwrap_err();
        match err {
            StoreError::RetryExhausted { collisions } => {
                assert_eq!(collisions.len(), 4);
                assert!(collisions.iter().all(StoreError::is_already_exists));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(store.keys().len(), 4);
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let store = ScriptedSessions::new(1, true);
        let mut e = entry();
        let err = insert_session_with_retry(&store, &mut e, 5).await.unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(_)));
        assert_eq!(store.keys().len(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_never_inserts() {
        let store = ScriptedSessions::new(0, false);
        let mut e = entry();
        let err = insert_session_with_retry(&store, &mut e, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::RetryExhausted { ref collisions } if collisions.is_empty()));
        assert!(store.keys().is_empty());
    }
}
