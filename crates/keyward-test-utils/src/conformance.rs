// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioral checks shared by every storage engine.
//!
//! Each check takes a freshly constructed, uninitialized store, initializes
//! it, and panics with a descriptive message on the first deviation.
//! Timestamps are compared with one second of tolerance.

use chrono::{DateTime, Duration, TimeZone, Utc};
use keyward_core::session_key::SESSION_KEY_LEN;
use keyward_core::{
    SessionEntry, SessionStorage, StoreError, UserField, UserId, UserLookup, UserModel,
    UserStorage, insert_session_with_retry, zero_instant,
};

/// Three users that insert cleanly into an empty store.
pub fn sample_users() -> Vec<UserModel> {
    let mut u1 = UserModel::new("user1", "user1@foo.com");
    u1.first_name = "Foo".into();
    u1.is_active = true;

    let mut u2 = UserModel::new("user2", "user2@bar.com");
    u2.is_active = true;
    u2.is_superuser = true;
    u2.is_staff = true;

    let mut u3 = UserModel::new("user-three", "user3@something.org");
    u3.is_active = true;
    u3.is_superuser = true;

    vec![u1, u2, u3]
}

/// Collides with the first sample user on username.
pub fn duplicate_username_user() -> UserModel {
    UserModel::new("user1", "something@something.com")
}

/// Collides with the third sample user on email only.
pub fn duplicate_email_user() -> UserModel {
    UserModel::new("user5", "user3@something.org")
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 9, d, 0, 0, 0).unwrap()
}

/// Sessions of users 1, 2 and 3 expiring on the 9th, 10th and 12th of
/// September 2019.
pub fn sample_sessions() -> Vec<SessionEntry> {
    vec![
        SessionEntry::new("A".repeat(SESSION_KEY_LEN), UserId(1), day(9)),
        SessionEntry::new("B".repeat(SESSION_KEY_LEN), UserId(2), day(10)),
        SessionEntry::new("C".repeat(SESSION_KEY_LEN), UserId(3), day(12)),
    ]
}

/// Reference instant for the clean-up scenario: removes two of the three
/// sample sessions.
pub fn clean_up_reference() -> DateTime<Utc> {
    day(11)
}

fn close_in_time(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() <= Duration::seconds(1)
}

/// Panic unless `got` holds the same field values as `want`.
pub fn assert_same_user(want: &UserModel, got: &UserModel) {
    let same = want.username == got.username
        && want.email == got.email
        && want.password == got.password
        && want.first_name == got.first_name
        && want.last_name == got.last_name
        && want.is_active == got.is_active
        && want.is_superuser == got.is_superuser
        && want.is_staff == got.is_staff
        && close_in_time(want.date_joined, got.date_joined)
        && close_in_time(want.last_login, got.last_login);
    assert!(same, "user mismatch:\n want {want:?}\n  got {got:?}");
}

pub fn assert_same_session(want: &SessionEntry, got: &SessionEntry) {
    let same = want.key == got.key
        && want.user == got.user
        && close_in_time(want.expire_date, got.expire_date);
    assert!(same, "session mismatch:\n want {want:?}\n  got {got:?}");
}

async fn init_users<S: UserStorage + ?Sized>(store: &S) {
    store.init_users().await.expect("init_users failed");
}

async fn init_sessions<S: SessionStorage + ?Sized>(store: &S) {
    store.init_sessions().await.expect("init_sessions failed");
}

/// Insert the sample users and return them with ids assigned.
pub async fn insert_samples<S: UserStorage + ?Sized>(store: &S) -> Vec<UserModel> {
    let mut users = sample_users();
    for user in &mut users {
        let before = Utc::now() - Duration::seconds(1);
        let id = store
            .insert_user(user)
            .await
            .unwrap_or_else(|e| panic!("insert of {} failed: {e}", user.username));
        assert!(id.is_valid(), "insert returned invalid id");
        assert_eq!(user.id, id, "insert did not write the id back");
        assert!(user.date_joined >= before, "date_joined not stamped");
        assert_eq!(user.last_login, zero_instant(), "last_login not reset");
    }
    users
}

/// Look every user up by id, username and (when unique) email.
pub async fn assert_lookups<S: UserStorage + ?Sized>(store: &S, users: &[UserModel], email_unique: bool) {
    for user in users {
        let by_id = store.get_user(user.id).await.expect("lookup by id failed");
        assert_eq!(by_id.id, user.id);
        assert_same_user(user, &by_id);

        let by_name = store
            .get_user_by_name(&user.username)
            .await
            .expect("lookup by username failed");
        assert_same_user(user, &by_name);

        if email_unique {
            let by_mail = store
                .get_user_by_email(&user.email)
                .await
                .expect("lookup by email failed");
            assert_same_user(user, &by_mail);
        }
    }
}

pub async fn check_user_init<S: UserStorage + ?Sized>(store: &S) {
    init_users(store).await;
}

pub async fn check_user_insert<S: UserStorage + ?Sized>(store: &S, email_unique: bool) {
    init_users(store).await;
    let users = insert_samples(store).await;
    let ids: std::collections::HashSet<_> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids.len(), users.len(), "ids are not distinct");

    let mut dup = duplicate_username_user();
    let err = store.insert_user(&mut dup).await.expect_err("duplicate username accepted");
    assert!(matches!(err, StoreError::UserExists(_)), "expected UserExists, got {err:?}");

    let mut dup = duplicate_email_user();
    let result = store.insert_user(&mut dup).await;
    if email_unique {
        let err = result.expect_err("duplicate email accepted");
        assert!(matches!(err, StoreError::UserExists(_)), "expected UserExists, got {err:?}");
    } else {
        result.expect("duplicate email rejected although emails are not unique");
    }
}

pub async fn check_user_lookup<S: UserStorage + ?Sized>(store: &S, email_unique: bool) {
    init_users(store).await;
    let users = insert_samples(store).await;
    assert_lookups(store, &users, email_unique).await;

    let err = store.get_user(UserId::INVALID).await.expect_err("invalid id found");
    assert!(matches!(err, StoreError::NoSuchUser(UserLookup::Id(UserId::INVALID))), "got {err:?}");

    let err = store
        .get_user_by_email("user@exists.not")
        .await
        .expect_err("unknown email found");
    assert!(matches!(err, StoreError::NoSuchUser(UserLookup::Email(_))), "got {err:?}");

    let err = store
        .get_user_by_name("nonexistent")
        .await
        .expect_err("unknown username found");
    assert!(matches!(err, StoreError::NoSuchUser(UserLookup::Username(_))), "got {err:?}");
}

/// Full updates followed by partial updates naming only the changed fields.
pub async fn check_user_update<S: UserStorage + ?Sized>(store: &S, email_unique: bool) {
    init_users(store).await;
    let mut users = insert_samples(store).await;

    users[0].username = "new-user1".into();
    users[1].email = "new@ok.de".into();
    users[2].username = "new-user3".into();
    users[2].is_superuser = false;

    for user in &users {
        store
            .update_user(user.id, user, &[])
            .await
            .expect("full update failed");
    }
    assert_lookups(store, &users, email_unique).await;

    users[0].username = "newer-user1".into();
    users[1].email = "newer@ok.de".into();
    users[2].username = "newer-user3".into();
    users[2].is_superuser = true;
    let fields: [&[&str]; 3] = [&["Username"], &["EMail"], &["Username", "IsSuperUser"]];
    for (user, names) in users.iter().zip(fields) {
        store
            .update_user_by_names(user.id, user, names)
            .await
            .expect("partial update failed");
    }
    assert_lookups(store, &users, email_unique).await;

    // Missing ids are not an error.
    store
        .update_user(UserId(i64::MAX), &users[0], &[])
        .await
        .expect("update of missing id failed");
}

/// Fields left out of a partial update keep their stored values.
pub async fn check_partial_update_isolation<S: UserStorage + ?Sized>(store: &S) {
    init_users(store).await;
    let users = insert_samples(store).await;
    let stored = &users[0];

    let mut changed = stored.clone();
    changed.username = "renamed".into();
    changed.email = "renamed@foo.com".into();
    changed.first_name = "Bar".into();
    changed.is_staff = true;
    changed.last_login = Utc::now();

    store
        .update_user(stored.id, &changed, &[UserField::FirstName, UserField::LastLogin])
        .await
        .expect("partial update failed");

    let got = store.get_user(stored.id).await.expect("lookup failed");
    assert_eq!(got.first_name, "Bar");
    assert!(close_in_time(got.last_login, changed.last_login));
    assert!(got.has_logged_in());
    assert_eq!(got.username, stored.username);
    assert_eq!(got.email, stored.email);
    assert!(!got.is_staff);

    // Names resolve case-insensitively; an unknown name changes nothing.
    store
        .update_user_by_names(stored.id, &changed, &["isstaff"])
        .await
        .expect("lower-case field name rejected");
    assert!(store.get_user(stored.id).await.unwrap().is_staff);

    let err = store
        .update_user_by_names(stored.id, &changed, &["Username", "Nickname"])
        .await
        .expect_err("unknown field accepted");
    assert!(matches!(err, StoreError::UnknownField(ref n) if n == "Nickname"), "got {err:?}");
    assert_eq!(store.get_user(stored.id).await.unwrap().username, stored.username);
}

/// An update that would duplicate another user's username is ambiguous.
pub async fn check_update_conflict<S: UserStorage + ?Sized>(store: &S, email_unique: bool) {
    init_users(store).await;
    let users = insert_samples(store).await;

    let mut clash = users[1].clone();
    clash.username = users[0].username.clone();
    let err = store
        .update_user(clash.id, &clash, &[UserField::Username])
        .await
        .expect_err("duplicate username accepted on update");
    assert!(matches!(err, StoreError::AmbiguousUpdate(_)), "got {err:?}");

    if email_unique {
        let mut clash = users[1].clone();
        clash.email = users[2].email.clone();
        let err = store
            .update_user(clash.id, &clash, &[])
            .await
            .expect_err("duplicate email accepted on update");
        assert!(matches!(err, StoreError::AmbiguousUpdate(_)), "got {err:?}");
    }

    assert_lookups(store, &users, email_unique).await;
}

pub async fn check_user_delete<S: UserStorage + ?Sized>(store: &S, email_unique: bool) {
    init_users(store).await;
    let users = insert_samples(store).await;

    store.delete_user(users[1].id).await.expect("delete failed");
    assert_lookups(store, &[users[0].clone(), users[2].clone()], email_unique).await;

    let err = store.get_user(users[1].id).await.expect_err("deleted user found");
    assert!(err.is_not_found(), "got {err:?}");

    store
        .delete_user(users[1].id)
        .await
        .expect("second delete of the same id failed");
    store
        .delete_user(UserId(i64::MAX))
        .await
        .expect("delete of missing id failed");
}

pub async fn check_session_init<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
}

async fn insert_sample_sessions<S: SessionStorage + ?Sized>(store: &S) -> Vec<SessionEntry> {
    let sessions = sample_sessions();
    for session in &sessions {
        store.insert_session(session).await.expect("session insert failed");
    }
    sessions
}

fn missing_keys() -> [String; 3] {
    ["X", "Y", "Z"].map(|c| c.repeat(SESSION_KEY_LEN))
}

pub async fn check_session_insert<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;
    for session in &sessions {
        let err = store
            .insert_session(session)
            .await
            .expect_err("duplicate session key accepted");
        assert!(
            matches!(err, StoreError::SessionExists { ref key } if *key == session.key),
            "got {err:?}"
        );
    }
}

pub async fn check_session_get<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;
    for session in &sessions {
        let got = store.get_session(&session.key).await.expect("get failed");
        assert_same_session(session, &got);
    }
    for key in missing_keys() {
        let err = store.get_session(&key).await.expect_err("missing key found");
        assert!(matches!(err, StoreError::NoSuchSession { .. }), "got {err:?}");
    }
}

pub async fn check_session_delete<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;
    for session in &sessions[..2] {
        store.delete_session(&session.key).await.expect("delete failed");
        let err = store.get_session(&session.key).await.expect_err("deleted session found");
        assert!(err.is_not_found(), "got {err:?}");
    }
    store.get_session(&sessions[2].key).await.expect("untouched session lost");
    for key in missing_keys() {
        store.delete_session(&key).await.expect("delete of missing key failed");
    }
}

pub async fn check_session_clean_up<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;

    let removed = store.clean_up(clean_up_reference()).await.expect("clean up failed");
    assert_eq!(removed, 2, "clean up removed {removed} sessions");

    let kept = store.get_session(&sessions[2].key).await.expect("valid session removed");
    assert_same_session(&sessions[2], &kept);
    for expired in &sessions[..2] {
        assert!(store.get_session(&expired.key).await.is_err());
    }

    assert_eq!(store.delete_for_user(UserId(1)).await.unwrap(), 0);
    assert_eq!(store.clean_up(clean_up_reference()).await.unwrap(), 0);
}

pub async fn check_session_delete_for_user<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;

    assert_eq!(store.delete_for_user(UserId(1)).await.expect("delete for user failed"), 1);
    assert!(store.get_session(&sessions[0].key).await.is_err());
    store.get_session(&sessions[1].key).await.expect("other user's session removed");

    assert_eq!(store.delete_for_user(UserId(1)).await.unwrap(), 0);
    // Clean-up after the user's session is gone only sees user 2's.
    assert_eq!(store.clean_up(clean_up_reference()).await.unwrap(), 1);
}

/// A session read back is valid strictly before its expiry and invalid at it.
pub async fn check_session_validity<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;
    let got = store.get_session(&sessions[1].key).await.expect("get failed");

    assert!(got.is_valid(got.expire_date - Duration::microseconds(1)));
    assert!(!got.is_valid(got.expire_date));
    assert!(!got.is_valid(clean_up_reference()));
    assert!(got.is_valid(day(9)));
}

/// The retry helper replaces a colliding key and gives up after the allowed
/// number of attempts.
pub async fn check_session_key_retry<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let sessions = insert_sample_sessions(store).await;

    let mut entry = SessionEntry::new(sessions[0].key.clone(), UserId(9), day(12));
    insert_session_with_retry(store, &mut entry, 3)
        .await
        .expect("retry did not recover from a collision");
    assert_ne!(entry.key, sessions[0].key);
    assert_eq!(entry.key.len(), SESSION_KEY_LEN);
    let stored = store.get_session(&entry.key).await.expect("retried session missing");
    assert_eq!(stored.user, UserId(9));

    let mut entry = SessionEntry::new(sessions[1].key.clone(), UserId(9), day(12));
    let err = insert_session_with_retry(store, &mut entry, 1)
        .await
        .expect_err("single attempt should not retry");
    match err {
        StoreError::RetryExhausted { collisions } => assert_eq!(collisions.len(), 1),
        other => panic!("expected RetryExhausted, got {other:?}"),
    }

    let mut entry = SessionEntry::new("D".repeat(SESSION_KEY_LEN), UserId(9), day(12));
    let err = insert_session_with_retry(store, &mut entry, 0).await.expect_err("zero attempts inserted");
    assert!(matches!(err, StoreError::RetryExhausted { ref collisions } if collisions.is_empty()));
    assert!(store.get_session(&entry.key).await.is_err());
}

/// Expiry and sweep reference that differ by less than a microsecond still
/// compare strictly.
pub async fn check_session_sub_microsecond_expiry<S: SessionStorage + ?Sized>(store: &S) {
    init_sessions(store).await;
    let expiry = clean_up_reference() + Duration::nanoseconds(500);
    let reference = expiry - Duration::nanoseconds(400);
    let session = SessionEntry::new("E".repeat(SESSION_KEY_LEN), UserId(5), expiry);
    store.insert_session(&session).await.expect("session insert failed");

    let stored = store.get_session(&session.key).await.expect("get failed");
    assert_eq!(stored.expire_date, expiry, "expiry lost precision");
    assert!(stored.is_valid(reference));

    assert_eq!(store.clean_up(reference).await.unwrap(), 0, "valid session swept");
    store.get_session(&session.key).await.expect("valid session removed");
    assert_eq!(store.clean_up(expiry).await.unwrap(), 1);
}
