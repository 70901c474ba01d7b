use std::collections::BTreeSet;

use sqlx::postgres::PgRow;
use sqlx::Row;

use reelmate_core::error::{Error, Result};
use reelmate_core::model::mpa::{MpaId, MpaRating};
use reelmate_core::model::user::{NewUser, User, UserId};
use reelmate_core::storage::StorageBackend;

/// PostgreSQL-backed storage for Reelmate.
///
/// Wraps a `sqlx::PgPool` and runs schema migrations on construction.
/// Semantics mirror the embedded SQLite backend exactly; only the SQL
/// dialect differs (`$N` placeholders, `BIGSERIAL` ids, `ON CONFLICT`).
pub struct PgStorage {
    pool: sqlx::PgPool,
}

impl PgStorage {
    /// Connect to a PostgreSQL database and run migrations.
    ///
    /// `url` is a standard `postgres://` connection string.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::PgPool::connect(url)
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;
        crate::migrations::run_migrations(&pool).await?;
        tracing::info!("Connected to PostgreSQL and ran migrations");
        Ok(Self { pool })
    }

    async fn load_friend_ids(&self, id: UserId) -> Result<BTreeSet<UserId>> {
        let rows = sqlx::query("SELECT friend_id FROM friendships WHERE user_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        let mut ids = BTreeSet::new();
        for row in &rows {
            ids.insert(row.try_get("friend_id")?);
        }
        Ok(ids)
    }

    async fn attach_friends(&self, mut user: User) -> Result<User> {
        user.friends = self.load_friend_ids(user.id).await?;
        Ok(user)
    }

    async fn fetch_user(&self, id: UserId) -> Result<User> {
        self.get_user(id).await?.ok_or(Error::UserNotFound(id))
    }
}

/// The standard SELECT column list for user rows; see `row_to_user`.
const USER_COLUMNS: &str = "id, email, login, name, birthday";

/// Map one user row to a `User` with an empty friends set.
///
/// Column contract: `id` (bigint), `email`, `login`, `name` (varchar) and
/// `birthday` (date), exactly the `USER_COLUMNS` list. Callers attach the
/// friends set afterwards.
fn row_to_user(row: &PgRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        login: row.try_get("login")?,
        name: row.try_get("name")?,
        birthday: row.try_get("birthday")?,
        friends: BTreeSet::new(),
    })
}

fn row_to_rating(row: &PgRow) -> std::result::Result<MpaRating, sqlx::Error> {
    Ok(MpaRating {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait::async_trait]
impl StorageBackend for PgStorage {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (email, login, name, birthday) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;
        Ok(User {
            id: row.try_get("id")?,
            email: user.email.clone(),
            login: user.login.clone(),
            name: user.name.clone(),
            birthday: user.birthday,
            friends: BTreeSet::new(),
        })
    }

    async fn update_user(&self, id: UserId, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET email = $1, login = $2, name = $3, birthday = $4 WHERE id = $5",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id));
        }
        self.fetch_user(id).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => {
                let user = row_to_user(&row)?;
                Ok(Some(self.attach_friends(user).await?))
            }
            None => Ok(None),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            users.push(self.attach_friends(row_to_user(row)?).await?);
        }
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        sqlx::query("DELETE FROM friendships WHERE user_id = $1 OR friend_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id));
        }
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // -----------------------------------------------------------------------
    // Friendship edges
    // -----------------------------------------------------------------------

    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        sqlx::query(
            "INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, friend_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;
        let user = self.fetch_user(user_id).await?;
        let friend = self.fetch_user(friend_id).await?;
        Ok((user, friend))
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        let user = self.fetch_user(user_id).await?;
        let friend = self.fetch_user(friend_id).await?;
        Ok((user, friend))
    }

    async fn list_friends(&self, user_id: UserId) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM friendships f \
             JOIN users u ON u.id = f.friend_id \
             WHERE f.user_id = $1 ORDER BY id"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        let mut friends = Vec::with_capacity(rows.len());
        for row in &rows {
            friends.push(self.attach_friends(row_to_user(row)?).await?);
        }
        Ok(friends)
    }

    async fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM friendships f1 \
             JOIN friendships f2 ON f2.friend_id = f1.friend_id \
             JOIN users u ON u.id = f1.friend_id \
             WHERE f1.user_id = $1 AND f2.user_id = $2 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(other_id)
            .fetch_all(&self.pool)
            .await?;
        let mut friends = Vec::with_capacity(rows.len());
        for row in &rows {
            friends.push(self.attach_friends(row_to_user(row)?).await?);
        }
        Ok(friends)
    }

    // -----------------------------------------------------------------------
    // MPA ratings
    // -----------------------------------------------------------------------

    async fn list_mpa_ratings(&self) -> Result<Vec<MpaRating>> {
        let rows = sqlx::query("SELECT id, name FROM mpa_ratings ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let mut ratings = Vec::with_capacity(rows.len());
        for row in &rows {
            ratings.push(row_to_rating(row)?);
        }
        Ok(ratings)
    }

    async fn get_mpa_rating(&self, id: MpaId) -> Result<Option<MpaRating>> {
        let row = sqlx::query("SELECT id, name FROM mpa_ratings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row_to_rating(&row)?)),
            None => Ok(None),
        }
    }

    async fn mpa_rating_exists(&self, id: MpaId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM mpa_ratings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
