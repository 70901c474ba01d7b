use crate::error::Result;

pub const CREATE_USERS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email VARCHAR NOT NULL,
    login VARCHAR NOT NULL,
    name VARCHAR NOT NULL,
    birthday DATE NOT NULL
)";

// Composite primary key keeps the edge set duplicate-free; the cascading
// foreign keys remove every edge touching a deleted user. SQLite only
// enforces them when the connection sets PRAGMA foreign_keys, so the
// backend also deletes edges explicitly on the user-delete path.
pub const CREATE_FRIENDSHIPS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS friendships (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    friend_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, friend_id)
)";

pub const CREATE_FRIENDSHIPS_FRIEND_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_friendships_friend_id ON friendships(friend_id)";

pub const CREATE_MPA_RATINGS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS mpa_ratings (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL
)";

pub const SEED_MPA_RATINGS: &str = "
INSERT OR IGNORE INTO mpa_ratings (id, name) VALUES
    (1, 'G'),
    (2, 'PG'),
    (3, 'PG-13'),
    (4, 'R'),
    (5, 'NC-17')";

pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_FRIENDSHIPS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_FRIENDSHIPS_FRIEND_INDEX)
        .execute(pool)
        .await?;
    sqlx::query(CREATE_MPA_RATINGS_TABLE).execute(pool).await?;
    sqlx::query(SEED_MPA_RATINGS).execute(pool).await?;
    Ok(())
}
