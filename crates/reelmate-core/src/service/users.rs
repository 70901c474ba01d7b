use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::user::{NewUser, User, UserId};
use crate::service::ReelmateEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: UserId,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

/// The identity-validation primitive. Fails with `Error::UserNotFound`
/// unless `id` resolves to a stored user; every operation that accepts a
/// user identifier goes through here before the identifier is used.
pub(crate) async fn ensure_exists(engine: &ReelmateEngine, id: UserId) -> Result<()> {
    if !engine.storage.user_exists(id).await? {
        tracing::debug!(user_id = id, "user lookup failed validation");
        return Err(Error::UserNotFound(id));
    }
    Ok(())
}

/// Field rules shared by create and update. A blank name is not a
/// violation; it falls back to the login in `normalized_name`.
fn validate_fields(email: &str, login: &str, birthday: NaiveDate) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::Validation("email must not be blank".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(Error::Validation(format!("malformed email: {email}"))),
    }
    if login.trim().is_empty() {
        return Err(Error::Validation("login must not be blank".to_string()));
    }
    if login.contains(' ') {
        return Err(Error::Validation(
            "login must not contain spaces".to_string(),
        ));
    }
    if birthday > Utc::now().date_naive() {
        return Err(Error::Validation(
            "birthday must not be in the future".to_string(),
        ));
    }
    Ok(())
}

fn normalized_name(name: Option<String>, login: &str) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n,
        _ => login.to_string(),
    }
}

pub async fn create(engine: &ReelmateEngine, request: CreateUserRequest) -> Result<User> {
    validate_fields(&request.email, &request.login, request.birthday)?;
    let name = normalized_name(request.name, &request.login);
    let draft = NewUser {
        email: request.email,
        login: request.login,
        name,
        birthday: request.birthday,
    };
    let user = engine.storage.insert_user(&draft).await?;
    tracing::debug!(user_id = user.id, login = %user.login, "created user");
    Ok(user)
}

pub async fn update(engine: &ReelmateEngine, request: UpdateUserRequest) -> Result<User> {
    validate_fields(&request.email, &request.login, request.birthday)?;
    ensure_exists(engine, request.id).await?;
    let name = normalized_name(request.name, &request.login);
    let draft = NewUser {
        email: request.email,
        login: request.login,
        name,
        birthday: request.birthday,
    };
    let user = engine.storage.update_user(request.id, &draft).await?;
    tracing::debug!(user_id = user.id, "updated user");
    Ok(user)
}

pub async fn get(engine: &ReelmateEngine, id: UserId) -> Result<User> {
    ensure_exists(engine, id).await?;
    engine.storage.get_user(id).await?.ok_or(Error::UserNotFound(id))
}

pub async fn list(engine: &ReelmateEngine) -> Result<Vec<User>> {
    engine.storage.list_users().await
}

pub async fn delete(engine: &ReelmateEngine, id: UserId) -> Result<()> {
    ensure_exists(engine, id).await?;
    engine.storage.delete_user(id).await?;
    tracing::debug!(user_id = id, "deleted user and its friendship edges");
    Ok(())
}
