use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResetTokensRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// One outstanding token per email: any previous token is dropped in the
/// same transaction that stores the new one.
pub async fn replace_for_email(
    pool: &PgPool,
    email: &str,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), ResetTokensRepoError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        DELETE FROM password_reset_tokens
        WHERE email = $1
        "#,
    )
    .bind(email)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO password_reset_tokens (token, email, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(token)
    .bind(email)
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn find_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<ResetTokenRecord>, ResetTokensRepoError> {
    let row = sqlx::query(
        r#"
        SELECT token, email, expires_at
        FROM password_reset_tokens
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    row.map(|row| {
        Ok(ResetTokenRecord {
            token: row.try_get("token")?,
            email: row.try_get("email")?,
            expires_at: row.try_get("expires_at")?,
        })
    })
    .transpose()
}

pub async fn delete_token(pool: &PgPool, token: &str) -> Result<bool, ResetTokensRepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM password_reset_tokens
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_expired(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, ResetTokensRepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM password_reset_tokens
        WHERE expires_at <= $1
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
