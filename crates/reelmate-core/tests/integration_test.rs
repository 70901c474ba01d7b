//! Integration tests: user lifecycle, friendship edge semantics, and the
//! MPA catalog over the full engine + in-memory SQLite stack.
//!
//! The friendship tests pin down the contract the rest of the system leans
//! on: directed edges, idempotent add/remove, validated identifiers, and a
//! duplicate-free mutual-friends intersection.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use reelmate_core::error::Error;
use reelmate_core::model::user::User;
use reelmate_core::service::users::{CreateUserRequest, UpdateUserRequest};
use reelmate_core::service::ReelmateEngine;
use reelmate_core::storage::sqlite::SqliteStorage;

async fn create_engine() -> Arc<ReelmateEngine> {
    let storage = Arc::new(
        SqliteStorage::open_in_memory()
            .await
            .expect("in-memory storage should open"),
    );
    Arc::new(ReelmateEngine::new(storage))
}

async fn create_user(engine: &ReelmateEngine, login: &str) -> User {
    engine
        .create_user(CreateUserRequest {
            email: format!("{login}@example.com"),
            login: login.to_string(),
            name: None,
            birthday: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
        })
        .await
        .expect("create user should succeed")
}

fn ids(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.id).collect()
}

// ===========================================================================
// User lifecycle
// ===========================================================================

#[tokio::test]
async fn test_user_create_get_update_list() {
    let engine = create_engine().await;

    let created = engine
        .create_user(CreateUserRequest {
            email: "grace@example.com".to_string(),
            login: "grace".to_string(),
            name: Some("Grace Hopper".to_string()),
            birthday: NaiveDate::from_ymd_opt(1906, 12, 9).unwrap(),
        })
        .await
        .expect("create should succeed");

    assert_eq!(created.id, 1);
    assert_eq!(created.email, "grace@example.com");
    assert_eq!(created.name, "Grace Hopper");
    assert!(created.friends.is_empty());

    let fetched = engine.get_user(1).await.expect("get should succeed");
    assert_eq!(fetched, created);

    let updated = engine
        .update_user(UpdateUserRequest {
            id: 1,
            email: "hopper@example.com".to_string(),
            login: "hopper".to_string(),
            name: None,
            birthday: NaiveDate::from_ymd_opt(1906, 12, 9).unwrap(),
        })
        .await
        .expect("update should succeed");
    assert_eq!(updated.email, "hopper@example.com");
    // Omitted name falls back to the login
    assert_eq!(updated.name, "hopper");

    let second = create_user(&engine, "ada").await;
    assert_eq!(second.id, 2, "ids are a sequence starting at 1");

    let all = engine.list_users().await.expect("list should succeed");
    assert_eq!(ids(&all), vec![1, 2]);
}

#[tokio::test]
async fn test_user_blank_name_defaults_to_login() {
    let engine = create_engine().await;

    let user = engine
        .create_user(CreateUserRequest {
            email: "ada@example.com".to_string(),
            login: "ada".to_string(),
            name: Some("   ".to_string()),
            birthday: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
        })
        .await
        .expect("create should succeed");
    assert_eq!(user.name, "ada");
}

#[tokio::test]
async fn test_user_field_validation_rejections() {
    let engine = create_engine().await;
    let birthday = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();

    let cases = [
        ("", "alice", birthday),
        ("terentjev.dr@", "alice", birthday),
        ("@example.com", "alice", birthday),
        ("a@b.c", "", birthday),
        ("a@b.c", "dol ore", birthday),
        ("a@b.c", "alice", NaiveDate::from_ymd_opt(2446, 8, 20).unwrap()),
    ];
    for (email, login, birthday) in cases {
        let err = engine
            .create_user(CreateUserRequest {
                email: email.to_string(),
                login: login.to_string(),
                name: None,
                birthday,
            })
            .await
            .expect_err("invalid fields must be rejected");
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    // A rejected create stores nothing
    assert!(engine.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_update_rejects_invalid_fields() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    let birthday = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();

    let cases = [
        ("terentjev.dr@", "alice", birthday),
        ("a@b.c", "dol ore", birthday),
        ("a@b.c", "alice", NaiveDate::from_ymd_opt(2446, 8, 20).unwrap()),
    ];
    for (email, login, birthday) in cases {
        let err = engine
            .update_user(UpdateUserRequest {
                id: 1,
                email: email.to_string(),
                login: login.to_string(),
                name: None,
                birthday,
            })
            .await
            .expect_err("invalid fields must be rejected");
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    // The rejected updates left the stored record untouched
    let stored = engine.get_user(1).await.unwrap();
    assert_eq!(stored.email, "alice@example.com");
    assert_eq!(stored.login, "alice");

    // Field rules are checked before the id is resolved, so an unknown id
    // with malformed fields still reports the field violation
    let err = engine
        .update_user(UpdateUserRequest {
            id: 42,
            email: "terentjev.dr@".to_string(),
            login: "alice".to_string(),
            name: None,
            birthday,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_user_operations_fail_for_unknown_id() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;

    let err = engine.get_user(42).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(42)));
    assert_eq!(err.to_string(), "user with id 42 does not exist");

    let err = engine
        .update_user(UpdateUserRequest {
            id: 42,
            email: "x@y.z".to_string(),
            login: "xyz".to_string(),
            name: None,
            birthday: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UserNotFound(42)));

    let err = engine.delete_user(42).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(42)));
}

// ===========================================================================
// Friendship edges
// ===========================================================================

#[tokio::test]
async fn test_add_friend_is_directed() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;

    let (alice, bob) = engine.add_friend(1, 2).await.expect("add should succeed");
    assert_eq!(alice.friends, BTreeSet::from([2]));
    assert!(bob.friends.is_empty(), "edges are one-directional");

    let outgoing = engine.list_friends(1).await.unwrap();
    assert_eq!(ids(&outgoing), vec![2]);
    assert!(engine.list_friends(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_friend_is_idempotent() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;

    let first = engine.add_friend(1, 2).await.expect("first add");
    let second = engine.add_friend(1, 2).await.expect("re-add must succeed");
    assert_eq!(first, second, "re-adding leaves the state unchanged");
    assert_eq!(engine.list_friends(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_friend_is_idempotent() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;
    engine.add_friend(1, 2).await.unwrap();

    let (alice, _) = engine.remove_friend(1, 2).await.expect("remove");
    assert!(alice.friends.is_empty());

    // Removing an edge that is not there is a quiet success
    let (alice, bob) = engine.remove_friend(1, 2).await.expect("re-remove");
    assert!(alice.friends.is_empty());
    assert!(bob.friends.is_empty());
}

#[tokio::test]
async fn test_concurrent_duplicate_adds_both_succeed() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;

    let (a, b) = tokio::join!(engine.add_friend(1, 2), engine.add_friend(1, 2));
    a.expect("concurrent add one");
    b.expect("concurrent add two");
    assert_eq!(engine.list_friends(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_self_friendship_is_permitted() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;

    let (before, after) = engine.add_friend(1, 1).await.expect("self add");
    assert_eq!(before, after);
    assert_eq!(before.friends, BTreeSet::from([1]));
    assert_eq!(ids(&engine.list_friends(1).await.unwrap()), vec![1]);
}

#[tokio::test]
async fn test_friend_operations_validate_both_identifiers() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;

    let err = engine.add_friend(1, 99).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(99)));

    let err = engine.add_friend(99, 1).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(99)));

    // Both unknown: the first-checked identifier is the one reported
    let err = engine.add_friend(98, 99).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(98)));

    let err = engine.remove_friend(99, 1).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(99)));

    let err = engine.list_friends(99).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(99)));

    let err = engine.common_friends(1, 99).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(99)));

    // None of the failed operations left an edge behind
    assert!(engine.list_friends(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_friends_is_ordered_and_duplicate_free() {
    let engine = create_engine().await;
    for login in ["a", "b", "c", "d"] {
        create_user(&engine, login).await;
    }
    engine.add_friend(1, 4).await.unwrap();
    engine.add_friend(1, 2).await.unwrap();
    engine.add_friend(1, 3).await.unwrap();
    engine.add_friend(1, 2).await.unwrap();

    let friends = engine.list_friends(1).await.unwrap();
    assert_eq!(ids(&friends), vec![2, 3, 4]);
}

// ===========================================================================
// Mutual friends
// ===========================================================================

#[tokio::test]
async fn test_common_friends_basic_scenario() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;
    create_user(&engine, "carol").await;

    engine.add_friend(1, 2).await.unwrap();
    engine.add_friend(1, 3).await.unwrap();
    engine.add_friend(2, 3).await.unwrap();

    // 1's outgoing set is {2, 3}, 2's is {3}; only 3 is shared
    let common = engine.common_friends(1, 2).await.unwrap();
    assert_eq!(ids(&common), vec![3]);
    assert_eq!(common[0].login, "carol");
}

#[tokio::test]
async fn test_common_friends_is_symmetric() {
    let engine = create_engine().await;
    for login in ["a", "b", "c", "d", "e"] {
        create_user(&engine, login).await;
    }
    for friend in [3, 4, 5] {
        engine.add_friend(1, friend).await.unwrap();
    }
    for friend in [4, 5] {
        engine.add_friend(2, friend).await.unwrap();
    }

    let forward = engine.common_friends(1, 2).await.unwrap();
    let backward = engine.common_friends(2, 1).await.unwrap();
    assert_eq!(ids(&forward), vec![4, 5]);
    assert_eq!(ids(&forward), ids(&backward));
}

#[tokio::test]
async fn test_common_friends_excludes_the_pair_itself() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;
    create_user(&engine, "carol").await;

    // Mutual edges between 1 and 2, and one genuinely shared friend
    engine.add_friend(1, 2).await.unwrap();
    engine.add_friend(2, 1).await.unwrap();
    engine.add_friend(1, 3).await.unwrap();
    engine.add_friend(2, 3).await.unwrap();

    let common = engine.common_friends(1, 2).await.unwrap();
    assert_eq!(
        ids(&common),
        vec![3],
        "neither endpoint appears without a self-edge"
    );
}

#[tokio::test]
async fn test_common_friends_empty_cases() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;
    create_user(&engine, "carol").await;

    assert!(engine.common_friends(1, 2).await.unwrap().is_empty());

    engine.add_friend(1, 3).await.unwrap();
    assert!(
        engine.common_friends(1, 2).await.unwrap().is_empty(),
        "one-sided friendship is not common"
    );
}

// ===========================================================================
// Cascade on user deletion
// ===========================================================================

#[tokio::test]
async fn test_delete_user_removes_edges_in_both_directions() {
    let engine = create_engine().await;
    create_user(&engine, "alice").await;
    create_user(&engine, "bob").await;
    create_user(&engine, "carol").await;

    engine.add_friend(1, 2).await.unwrap();
    engine.add_friend(2, 1).await.unwrap();
    engine.add_friend(3, 1).await.unwrap();

    engine.delete_user(1).await.expect("delete should succeed");

    let err = engine.get_user(1).await.unwrap_err();
    assert!(matches!(err, Error::UserNotFound(1)));

    assert!(engine.list_friends(2).await.unwrap().is_empty());
    assert!(engine.list_friends(3).await.unwrap().is_empty());
    assert!(engine.get_user(2).await.unwrap().friends.is_empty());
}

// ===========================================================================
// MPA catalog
// ===========================================================================

#[tokio::test]
async fn test_mpa_catalog_is_seeded_and_ordered() {
    let engine = create_engine().await;

    let ratings = engine.list_mpa_ratings().await.expect("list ratings");
    let names: Vec<&str> = ratings.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["G", "PG", "PG-13", "R", "NC-17"]);
    assert_eq!(ratings[0].id, 1);

    let pg13 = engine.get_mpa_rating(3).await.expect("get rating");
    assert_eq!(pg13.name, "PG-13");

    let err = engine.get_mpa_rating(99).await.unwrap_err();
    assert!(matches!(err, Error::RatingNotFound(99)));
    assert_eq!(err.to_string(), "MPA rating with id 99 does not exist");
}
