use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::http::middleware::session;
use crate::state::AppState;
use pinboard_core::types::email::EmailAddress;
use pinboard_infra::db::users_repo::{self, UserRecord};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub expires_at: String,
    pub max_age_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub signed_out: bool,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("sessions not configured")]
    MissingConfig,
    #[error("name is required")]
    MissingName,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_CHARS} characters")]
    WeakPassword,
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed")]
    Hash,
    #[error("token issuance failed")]
    TokenIssue,
    #[error("db error: {0}")]
    Db(#[from] users_repo::UsersRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AuthApiError> {
    let pool = state.db.as_ref().ok_or(AuthApiError::DbUnavailable)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AuthApiError::MissingName);
    }
    let email =
        EmailAddress::try_from(payload.email.as_str()).map_err(|_| AuthApiError::InvalidEmail)?;
    validate_password(&payload.password)?;

    if users_repo::email_exists(pool, email.as_str()).await? {
        return Err(AuthApiError::EmailTaken);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users_repo::insert_user(pool, name, email.as_str(), &password_hash).await?;
    let body = Json(RegisterResponse {
        user: public_user(&user),
    });
    Ok((StatusCode::CREATED, body).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthApiError> {
    let pool = state.db.as_ref().ok_or(AuthApiError::DbUnavailable)?;
    let secret = state
        .config
        .session_secret
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(AuthApiError::MissingConfig)?;

    // Malformed addresses cannot match an account; same answer as a wrong
    // password so the response shape is uniform.
    let email = EmailAddress::try_from(payload.email.as_str())
        .map_err(|_| AuthApiError::InvalidCredentials)?;
    let user = users_repo::find_by_email(pool, email.as_str())
        .await?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|_| AuthApiError::Hash)?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AuthApiError::InvalidCredentials);
    }

    let max_age_secs = i64::try_from(state.config.session_max_age.as_secs())
        .map_err(|_| AuthApiError::TokenIssue)?;
    let token = session::issue_token(secret, user.id, max_age_secs)
        .map_err(|_| AuthApiError::TokenIssue)?;
    let secure = session::is_https(&headers);
    let cookie = session::build_cookie_value(&token, max_age_secs, secure);

    let expires_at = (Utc::now() + Duration::seconds(max_age_secs)).to_rfc3339();
    let response = Json(LoginResponse {
        user: public_user(&user),
        expires_at,
        max_age_secs,
    })
    .into_response();
    Ok(session::attach_cookie(response, cookie))
}

pub async fn logout(headers: HeaderMap) -> Response {
    let secure = session::is_https(&headers);
    let response = Json(LogoutResponse { signed_out: true }).into_response();
    session::attach_cookie(response, session::clear_cookie_value(secure))
}

pub(crate) fn public_user(user: &UserRecord) -> PublicUser {
    PublicUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        avatar_url: user.avatar_url.clone(),
        role: user.role.clone(),
        created_at: user.created_at,
    }
}

fn validate_password(password: &str) -> Result<(), AuthApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthApiError::WeakPassword);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthApiError::Hash)
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthApiError::DbUnavailable | AuthApiError::MissingConfig => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AuthApiError::MissingName
            | AuthApiError::InvalidEmail
            | AuthApiError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthApiError::EmailTaken => StatusCode::CONFLICT,
            AuthApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthApiError::Hash | AuthApiError::TokenIssue | AuthApiError::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, validate_password};
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    #[test]
    fn validate_password_requires_six_chars() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn hash_password_verifies_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"hunter2!", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong", &parsed)
            .is_err());
    }
}
