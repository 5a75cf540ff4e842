use anyhow::Context;
use uuid::Uuid;

/// Returns the id for `username`, creating the user on first sight.
pub async fn ensure_user(conn: &mut sqlx::PgConnection, username: &str) -> anyhow::Result<Uuid> {
    let username = username.trim();
    anyhow::ensure!(!username.is_empty(), "username must be non-empty");

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (id, username) VALUES ($1, $2) \
         ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("upsert user {username} failed"))?;
    Ok(id)
}

pub async fn find_user(pool: &sqlx::PgPool, username: &str) -> anyhow::Result<Option<Uuid>> {
    sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username.trim())
        .fetch_optional(pool)
        .await
        .with_context(|| format!("lookup user {username} failed"))
}
