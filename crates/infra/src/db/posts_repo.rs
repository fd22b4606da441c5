use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PostsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub media: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub author_email: String,
    pub author_avatar_url: Option<String>,
    pub comments_count: i64,
    pub likes_count: i64,
}

const POST_COLUMNS: &str = r#"
    p.id,
    p.author_id,
    p.content,
    p.media,
    p.created_at,
    u.name AS author_name,
    u.email AS author_email,
    u.avatar_url AS author_avatar_url,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count
"#;

pub async fn list_posts(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostRecord>, PostsRepoError> {
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        ORDER BY p.created_at DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(map_post).collect()
}

pub async fn count_posts(pool: &PgPool) -> Result<i64, PostsRepoError> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS count
        FROM posts
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(row.try_get("count")?)
}

pub async fn find_post(pool: &PgPool, id: Uuid) -> Result<Option<PostRecord>, PostsRepoError> {
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE p.id = $1
        "#
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.map(map_post).transpose()
}

pub async fn insert_post(
    pool: &PgPool,
    author_id: Uuid,
    content: &str,
    media: &[String],
) -> Result<(Uuid, DateTime<Utc>), PostsRepoError> {
    let row = sqlx::query(
        r#"
        INSERT INTO posts (author_id, content, media)
        VALUES ($1, $2, $3)
        RETURNING id, created_at
        "#,
    )
    .bind(author_id)
    .bind(content)
    .bind(media)
    .fetch_one(pool)
    .await?;
    Ok((row.try_get("id")?, row.try_get("created_at")?))
}

pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<bool, PostsRepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn map_post(row: sqlx::postgres::PgRow) -> Result<PostRecord, PostsRepoError> {
    Ok(PostRecord {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        media: row.try_get("media")?,
        created_at: row.try_get("created_at")?,
        author_name: row.try_get("author_name")?,
        author_email: row.try_get("author_email")?,
        author_avatar_url: row.try_get("author_avatar_url")?,
        comments_count: row.try_get("comments_count")?,
        likes_count: row.try_get("likes_count")?,
    })
}
