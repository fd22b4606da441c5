use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UsersRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserRecord, UsersRepoError> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password_hash, avatar_url, role, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(ROLE_USER)
    .fetch_one(pool)
    .await?;
    map_user(row)
}

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, UsersRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password_hash, avatar_url, role, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.map(map_user).transpose()
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, UsersRepoError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, password_hash, avatar_url, role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(map_user).transpose()
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, UsersRepoError> {
    let row = sqlx::query(
        r#"
        SELECT 1 AS present
        FROM users
        WHERE email = $1
        LIMIT 1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    avatar_url: Option<&str>,
) -> Result<Option<UserRecord>, UsersRepoError> {
    let row = sqlx::query(
        r#"
        UPDATE users
        SET name = $2, avatar_url = $3
        WHERE id = $1
        RETURNING id, name, email, password_hash, avatar_url, role, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(avatar_url)
    .fetch_optional(pool)
    .await?;
    row.map(map_user).transpose()
}

pub async fn update_password_hash(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<bool, UsersRepoError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn map_user(row: sqlx::postgres::PgRow) -> Result<UserRecord, UsersRepoError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        avatar_url: row.try_get("avatar_url")?,
        role: row.try_get("role")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{UserRecord, ROLE_ADMIN, ROLE_USER};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn user(role: &str) -> UserRecord {
        UserRecord {
            id: Uuid::from_u128(1),
            name: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            avatar_url: None,
            role: role.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn admin_flag_follows_role() {
        assert!(user(ROLE_ADMIN).is_admin());
        assert!(!user(ROLE_USER).is_admin());
    }
}
