use reelmate_core::error::{Error, Result};

/// Run all PostgreSQL schema migrations, including the MPA seed rows.
/// Safe to re-run: every statement is conditional or conflict-tolerant.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<()> {
    // 1. users
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR NOT NULL,
    login VARCHAR NOT NULL,
    name VARCHAR NOT NULL,
    birthday DATE NOT NULL
)
"#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Storage(format!("create users: {e}")))?;

    // 2. friendships: the composite key keeps the edge set duplicate-free,
    // cascading foreign keys take a deleted user's edges with it
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS friendships (
    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    friend_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, friend_id)
)
"#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Storage(format!("create friendships: {e}")))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_friendships_friend_id ON friendships(friend_id)")
        .execute(pool)
        .await
        .map_err(|e| Error::Storage(format!("create friendships index: {e}")))?;

    // 3. mpa_ratings
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS mpa_ratings (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL
)
"#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Storage(format!("create mpa_ratings: {e}")))?;

    sqlx::query(
        "INSERT INTO mpa_ratings (id, name) VALUES \
         (1, 'G'), (2, 'PG'), (3, 'PG-13'), (4, 'R'), (5, 'NC-17') \
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Storage(format!("seed mpa_ratings: {e}")))?;

    Ok(())
}
