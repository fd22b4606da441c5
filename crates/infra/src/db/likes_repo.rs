use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LikesRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct LikeEntry {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

pub async fn has_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<bool, LikesRepoError> {
    let row = sqlx::query(
        r#"
        SELECT 1 AS present
        FROM likes
        WHERE post_id = $1 AND user_id = $2
        LIMIT 1
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_like(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<bool, LikesRepoError> {
    let result = sqlx::query(
        r#"
        INSERT INTO likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_like(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<bool, LikesRepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM likes
        WHERE post_id = $1 AND user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_likes(pool: &PgPool, post_id: Uuid) -> Result<i64, LikesRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM likes
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;
    Ok(row.try_get("count")?)
}

pub async fn list_user_ids(pool: &PgPool, post_id: Uuid) -> Result<Vec<Uuid>, LikesRepoError> {
    let rows = sqlx::query(
        r#"
        SELECT user_id
        FROM likes
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        ids.push(row.try_get("user_id")?);
    }
    Ok(ids)
}

pub async fn list_for_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<LikeEntry>, LikesRepoError> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query(
        r#"
        SELECT post_id, user_id
        FROM likes
        WHERE post_id = ANY($1)
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        entries.push(LikeEntry {
            post_id: row.try_get("post_id")?,
            user_id: row.try_get("user_id")?,
        });
    }
    Ok(entries)
}
