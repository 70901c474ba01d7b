pub mod migrations;
pub mod sqlite;

use crate::error::Result;
use crate::model::mpa::{MpaId, MpaRating};
use crate::model::user::{NewUser, User, UserId};

/// Relational persistence for users, friendship edges, and the MPA rating
/// catalog.
///
/// Backends do NOT validate identifier existence; that is the service
/// layer's contract. A method here fails only when the underlying store
/// fails (surfaced as `Error::Storage`), with two deliberate exceptions:
/// `update_user` and `delete_user` report `UserNotFound` when no row
/// matched, so callers can trust their postconditions.
///
/// Every user record returned from any method carries its `friends` set,
/// re-read from the friendship table in the same call.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    // Users
    async fn insert_user(&self, user: &NewUser) -> Result<User>;
    async fn update_user(&self, id: UserId, user: &NewUser) -> Result<User>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn delete_user(&self, id: UserId) -> Result<()>;
    async fn user_exists(&self, id: UserId) -> Result<bool>;

    // Friendship edges. All four take raw identifier pairs; an edge
    // `(user_id, friend_id)` means "user_id lists friend_id as a friend"
    // and implies nothing about the reverse direction. Mutations return
    // both endpoints' refreshed records.
    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)>;
    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)>;
    async fn list_friends(&self, user_id: UserId) -> Result<Vec<User>>;
    async fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>>;

    // MPA ratings
    async fn list_mpa_ratings(&self) -> Result<Vec<MpaRating>>;
    async fn get_mpa_rating(&self, id: MpaId) -> Result<Option<MpaRating>>;
    async fn mpa_rating_exists(&self, id: MpaId) -> Result<bool>;
}
