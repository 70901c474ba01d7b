use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use reelmate_core::error::Error as CoreError;
use reelmate_core::model::mpa::{MpaId, MpaRating};
use reelmate_core::model::user::{User, UserId};
use reelmate_core::service::users::{CreateUserRequest, UpdateUserRequest};
use reelmate_core::service::ReelmateEngine;

type AppState = Arc<ReelmateEngine>;

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

pub struct AppError(CoreError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self.0 {
            CoreError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            CoreError::UserNotFound(_) | CoreError::RatingNotFound(_) => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            other => {
                tracing::error!("internal error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        AppError(e)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /users -- register a new user.
pub async fn create_user_handler(
    State(engine): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = engine.create_user(request).await?;
    Ok(Json(user))
}

/// PUT /users -- update an existing user (id in the body).
pub async fn update_user_handler(
    State(engine): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = engine.update_user(request).await?;
    Ok(Json(user))
}

/// GET /users -- list all users in id order.
pub async fn list_users_handler(
    State(engine): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = engine.list_users().await?;
    Ok(Json(users))
}

/// GET /users/{id} -- retrieve a single user.
pub async fn get_user_handler(
    State(engine): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = engine.get_user(id).await?;
    Ok(Json(user))
}

/// DELETE /users/{id} -- delete a user and every friendship edge that
/// touches it.
pub async fn delete_user_handler(
    State(engine): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode, AppError> {
    engine.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/{id}/friends/{friend_id} -- record that `id` lists
/// `friend_id` as a friend. Responds with both refreshed user records.
pub async fn add_friend_handler(
    State(engine): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> Result<Json<(User, User)>, AppError> {
    let pair = engine.add_friend(id, friend_id).await?;
    Ok(Json(pair))
}

/// DELETE /users/{id}/friends/{friend_id} -- drop the edge if present.
/// Responds with both refreshed user records.
pub async fn remove_friend_handler(
    State(engine): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> Result<Json<(User, User)>, AppError> {
    let pair = engine.remove_friend(id, friend_id).await?;
    Ok(Json(pair))
}

/// GET /users/{id}/friends -- the users `id` lists as friends.
pub async fn list_friends_handler(
    State(engine): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<User>>, AppError> {
    let friends = engine.list_friends(id).await?;
    Ok(Json(friends))
}

/// GET /users/{id}/friends/common/{other_id} -- mutual friends of the two.
pub async fn common_friends_handler(
    State(engine): State<AppState>,
    Path((id, other_id)): Path<(UserId, UserId)>,
) -> Result<Json<Vec<User>>, AppError> {
    let friends = engine.common_friends(id, other_id).await?;
    Ok(Json(friends))
}

/// GET /mpa -- all MPA rating tiers in id order.
pub async fn list_mpa_handler(
    State(engine): State<AppState>,
) -> Result<Json<Vec<MpaRating>>, AppError> {
    let ratings = engine.list_mpa_ratings().await?;
    Ok(Json(ratings))
}

/// GET /mpa/{id} -- one MPA rating tier.
pub async fn get_mpa_handler(
    State(engine): State<AppState>,
    Path(id): Path<MpaId>,
) -> Result<Json<MpaRating>, AppError> {
    let rating = engine.get_mpa_rating(id).await?;
    Ok(Json(rating))
}

/// GET /health -- liveness endpoint.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
