pub mod friends;
pub mod mpa;
pub mod users;

use std::sync::Arc;

use crate::error::Result;
use crate::model::mpa::{MpaId, MpaRating};
use crate::model::user::{User, UserId};
use crate::storage::StorageBackend;

/// The application engine: identifier validation and orchestration over an
/// injected storage backend. Built once at startup with an explicitly
/// constructed backend and shared behind `Arc`; there is no global registry.
pub struct ReelmateEngine {
    pub storage: Arc<dyn StorageBackend>,
}

impl ReelmateEngine {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn create_user(&self, request: users::CreateUserRequest) -> Result<User> {
        users::create(self, request).await
    }

    pub async fn update_user(&self, request: users::UpdateUserRequest) -> Result<User> {
        users::update(self, request).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        users::get(self, id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        users::list(self).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        users::delete(self, id).await
    }

    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        friends::add(self, user_id, friend_id).await
    }

    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        friends::remove(self, user_id, friend_id).await
    }

    pub async fn list_friends(&self, user_id: UserId) -> Result<Vec<User>> {
        friends::list(self, user_id).await
    }

    pub async fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        friends::common(self, user_id, other_id).await
    }

    pub async fn list_mpa_ratings(&self) -> Result<Vec<MpaRating>> {
        mpa::list(self).await
    }

    pub async fn get_mpa_rating(&self, id: MpaId) -> Result<MpaRating> {
        mpa::get(self, id).await
    }
}
