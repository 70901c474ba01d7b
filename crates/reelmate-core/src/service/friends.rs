//! Friendship operations over directed edges `(user_id, friend_id)`.
//!
//! Edges are asymmetric: adding one direction never implies the other.
//! Every operation validates its identifiers through
//! [`users::ensure_exists`] before touching the edge table, first argument
//! first, so the first unknown identifier is the one reported and a failed
//! validation never leaves a partial mutation behind.

use crate::error::Result;
use crate::model::user::{User, UserId};
use crate::service::{users, ReelmateEngine};

/// Record that `user_id` lists `friend_id` as a friend and return both
/// refreshed user records. Re-adding an existing edge succeeds unchanged.
pub async fn add(
    engine: &ReelmateEngine,
    user_id: UserId,
    friend_id: UserId,
) -> Result<(User, User)> {
    users::ensure_exists(engine, user_id).await?;
    users::ensure_exists(engine, friend_id).await?;
    tracing::debug!(user_id, friend_id, "adding friend");
    engine.storage.add_friend(user_id, friend_id).await
}

/// Drop the edge if present; removing an absent edge is a quiet no-op.
/// Returns both refreshed user records either way.
pub async fn remove(
    engine: &ReelmateEngine,
    user_id: UserId,
    friend_id: UserId,
) -> Result<(User, User)> {
    users::ensure_exists(engine, user_id).await?;
    users::ensure_exists(engine, friend_id).await?;
    tracing::debug!(user_id, friend_id, "removing friend");
    engine.storage.remove_friend(user_id, friend_id).await
}

/// Every user `user_id` lists as a friend, in ascending identifier order.
pub async fn list(engine: &ReelmateEngine, user_id: UserId) -> Result<Vec<User>> {
    users::ensure_exists(engine, user_id).await?;
    engine.storage.list_friends(user_id).await
}

/// Users both arguments list as friends: the intersection of the two
/// outgoing edge sets, symmetric in content regardless of argument order.
pub async fn common(
    engine: &ReelmateEngine,
    user_id: UserId,
    other_id: UserId,
) -> Result<Vec<User>> {
    users::ensure_exists(engine, user_id).await?;
    users::ensure_exists(engine, other_id).await?;
    engine.storage.common_friends(user_id, other_id).await
}
