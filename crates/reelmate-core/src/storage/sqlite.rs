use std::collections::BTreeSet;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::model::mpa::{MpaId, MpaRating};
use crate::model::user::{NewUser, User, UserId};
use crate::storage::StorageBackend;

/// SQLite-backed storage for Reelmate.
///
/// Wraps a `sqlx::SqlitePool` and runs schema migrations on construction.
/// This is the default embedded backend; the production PostgreSQL backend
/// lives in the `reelmate-postgres` crate and implements the same trait.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if missing) a database file and run migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        super::migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory database, mainly for tests.
    ///
    /// The pool is pinned to a single connection that is never reaped:
    /// every SQLite `:memory:` connection is its own database, so a second
    /// connection would see empty tables.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        super::migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn load_friend_ids(&self, id: UserId) -> Result<BTreeSet<UserId>> {
        let rows = sqlx::query("SELECT friend_id FROM friendships WHERE user_id = ?")
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

    /// `get_user` for an id the caller just proved present. The fallback
    /// error covers a concurrent delete between the two statements.
    async fn fetch_user(&self, id: UserId) -> Result<User> {
        self.get_user(id).await?.ok_or(Error::UserNotFound(id))
    }
}

/// The standard SELECT column list for user rows. Unqualified: it resolves
/// against `users` both in single-table selects and in joins with
/// `friendships`, which shares no column name with it.
const USER_COLUMNS: &str = "id, email, login, name, birthday";

/// Map one user row to a `User` with an empty friends set.
///
/// Column contract: `id` (integer), `email`, `login`, `name` (text) and
/// `birthday` (ISO-8601 date), exactly the `USER_COLUMNS` list. Callers
/// attach the friends set afterwards; a row alone cannot know it.
fn row_to_user(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        login: row.try_get("login")?,
        name: row.try_get("name")?,
        birthday: row.try_get("birthday")?,
        friends: BTreeSet::new(),
    })
}

fn row_to_rating(row: &SqliteRow) -> std::result::Result<MpaRating, sqlx::Error> {
    Ok(MpaRating {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait::async_trait]
impl StorageBackend for SqliteStorage {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let result =
            sqlx::query("INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)")
                .bind(&user.email)
                .bind(&user.login)
                .bind(&user.name)
                .bind(user.birthday)
                .execute(&self.pool)
                .await?;
        Ok(User {
            id: result.last_insert_rowid(),
            email: user.email.clone(),
            login: user.login.clone(),
            name: user.name.clone(),
            birthday: user.birthday,
            friends: BTreeSet::new(),
        })
    }

    async fn update_user(&self, id: UserId, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE id = ?",
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
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
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
        // Edges first: the user's disappearance must take every edge it
        // appears in, on either side, with it.
        sqlx::query("DELETE FROM friendships WHERE user_id = ? OR friend_id = ?")
            .bind(id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id));
        }
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // -----------------------------------------------------------------------
    // Friendship edges
    // -----------------------------------------------------------------------

    async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        // OR IGNORE absorbs the duplicate-key conflict: re-adding an
        // existing edge is a success, and two concurrent adds both are.
        sqlx::query("INSERT OR IGNORE INTO friendships (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        let user = self.fetch_user(user_id).await?;
        let friend = self.fetch_user(friend_id).await?;
        Ok((user, friend))
    }

    async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> Result<(User, User)> {
        // Deleting an absent edge is a no-op, not an error.
        sqlx::query("DELETE FROM friendships WHERE user_id = ? AND friend_id = ?")
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
             WHERE f.user_id = ? ORDER BY id"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        let mut friends = Vec::with_capacity(rows.len());
        for row in &rows {
            friends.push(self.attach_friends(row_to_user(row)?).await?);
        }
        Ok(friends)
    }

    async fn common_friends(&self, user_id: UserId, other_id: UserId) -> Result<Vec<User>> {
        // Set intersection over both users' outgoing edges. The composite
        // primary key on friendships keeps the join duplicate-free.
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM friendships f1 \
             JOIN friendships f2 ON f2.friend_id = f1.friend_id \
             JOIN users u ON u.id = f1.friend_id \
             WHERE f1.user_id = ? AND f2.user_id = ? ORDER BY id"
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
        let row = sqlx::query("SELECT id, name FROM mpa_ratings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row_to_rating(&row)?)),
            None => Ok(None),
        }
    }

    async fn mpa_rating_exists(&self, id: MpaId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM mpa_ratings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
