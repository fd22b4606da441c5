use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;
use pinboard_core::types::email::EmailAddress;
use pinboard_infra::db::{reset_tokens_repo, users_repo};

// Identical answer whether or not the account exists, so the endpoint
// cannot be used to probe registered addresses.
const FORGOT_MESSAGE: &str =
    "If the email exists, password reset instructions have been sent.";
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum PasswordResetApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("email is required")]
    MissingEmail,
    #[error("token and password are required")]
    MissingFields,
    #[error("password must be at least {MIN_PASSWORD_CHARS} characters")]
    WeakPassword,
    #[error("reset link is invalid or has expired")]
    InvalidToken,
    #[error("account not found")]
    AccountMissing,
    #[error("password hashing failed")]
    Hash,
    #[error("db error: {0}")]
    Users(#[from] users_repo::UsersRepoError),
    #[error("db error: {0}")]
    Tokens(#[from] reset_tokens_repo::ResetTokensRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, PasswordResetApiError> {
    let pool = state
        .db
        .as_ref()
        .ok_or(PasswordResetApiError::DbUnavailable)?;
    if payload.email.trim().is_empty() {
        return Err(PasswordResetApiError::MissingEmail);
    }
    // A malformed address matches no account; answer uniformly.
    let Ok(email) = EmailAddress::try_from(payload.email.as_str()) else {
        return Ok(Json(MessageResponse {
            message: FORGOT_MESSAGE,
        }));
    };
    let Some(user) = users_repo::find_by_email(pool, email.as_str()).await? else {
        return Ok(Json(MessageResponse {
            message: FORGOT_MESSAGE,
        }));
    };

    let token = Uuid::new_v4().to_string();
    let ttl_secs = i64::try_from(state.config.reset_token_ttl.as_secs()).unwrap_or(3600);
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    reset_tokens_repo::replace_for_email(pool, email.as_str(), &token, expires_at).await?;

    let reset_link = format!("{}?token={}", state.config.reset_base_url, token);
    if let Err(err) = state
        .mailer
        .send_password_reset(&user.email, &user.name, &reset_link)
        .await
    {
        // The uniform response stands even when delivery fails.
        warn!(error = %err, "password reset mail delivery failed");
    }

    Ok(Json(MessageResponse {
        message: FORGOT_MESSAGE,
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, PasswordResetApiError> {
    let pool = state
        .db
        .as_ref()
        .ok_or(PasswordResetApiError::DbUnavailable)?;
    let token = payload.token.trim();
    if token.is_empty() || payload.password.is_empty() {
        return Err(PasswordResetApiError::MissingFields);
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PasswordResetApiError::WeakPassword);
    }

    let record = reset_tokens_repo::find_token(pool, token)
        .await?
        .ok_or(PasswordResetApiError::InvalidToken)?;
    if record.expires_at <= Utc::now() {
        reset_tokens_repo::delete_token(pool, token).await?;
        return Err(PasswordResetApiError::InvalidToken);
    }

    let user = users_repo::find_by_email(pool, &record.email)
        .await?
        .ok_or(PasswordResetApiError::AccountMissing)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordResetApiError::Hash)?;
    users_repo::update_password_hash(pool, user.id, &password_hash).await?;
    reset_tokens_repo::delete_token(pool, token).await?;

    Ok(Json(MessageResponse {
        message: "Password updated. Sign in with your new password.",
    }))
}

impl IntoResponse for PasswordResetApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            PasswordResetApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PasswordResetApiError::MissingEmail
            | PasswordResetApiError::MissingFields
            | PasswordResetApiError::WeakPassword
            | PasswordResetApiError::InvalidToken => StatusCode::BAD_REQUEST,
            PasswordResetApiError::AccountMissing => StatusCode::NOT_FOUND,
            PasswordResetApiError::Hash
            | PasswordResetApiError::Users(_)
            | PasswordResetApiError::Tokens(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
