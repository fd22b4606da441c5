use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CommentsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.post_id,
    c.parent_id,
    c.author_id,
    u.name AS author_name,
    u.avatar_url AS author_avatar_url,
    c.content,
    c.created_at
"#;

pub async fn list_for_post(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Vec<CommentRecord>, CommentsRepoError> {
    let sql = format!(
        r#"
        SELECT {COMMENT_COLUMNS}
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#
    );
    let rows = sqlx::query(&sql).bind(post_id).fetch_all(pool).await?;
    rows.into_iter().map(map_comment).collect()
}

/// Flat comment slice for a page of posts, creation-ordered so parents
/// precede their replies.
pub async fn list_for_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<CommentRecord>, CommentsRepoError> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        r#"
        SELECT {COMMENT_COLUMNS}
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ANY($1)
        ORDER BY c.created_at ASC
        "#
    );
    let rows = sqlx::query(&sql).bind(post_ids).fetch_all(pool).await?;
    rows.into_iter().map(map_comment).collect()
}

pub async fn find_comment(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<CommentRecord>, CommentsRepoError> {
    let sql = format!(
        r#"
        SELECT {COMMENT_COLUMNS}
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.id = $1
        "#
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.map(map_comment).transpose()
}

pub async fn insert_comment(
    pool: &PgPool,
    post_id: Uuid,
    parent_id: Option<Uuid>,
    author_id: Uuid,
    content: &str,
) -> Result<(Uuid, DateTime<Utc>), CommentsRepoError> {
    let row = sqlx::query(
        r#"
        INSERT INTO comments (post_id, parent_id, author_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, created_at
        "#,
    )
    .bind(post_id)
    .bind(parent_id)
    .bind(author_id)
    .bind(content)
    .fetch_one(pool)
    .await?;
    Ok((row.try_get("id")?, row.try_get("created_at")?))
}

pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<bool, CommentsRepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn map_comment(row: sqlx::postgres::PgRow) -> Result<CommentRecord, CommentsRepoError> {
    Ok(CommentRecord {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        parent_id: row.try_get("parent_id")?,
        author_id: row.try_get("author_id")?,
        author_name: row.try_get("author_name")?,
        author_avatar_url: row.try_get("author_avatar_url")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}
