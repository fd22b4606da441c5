use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::middleware::session::CurrentUser;
use crate::http::routes::auth::{public_user, PublicUser};
use crate::state::AppState;
use pinboard_infra::db::users_repo;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

#[derive(Debug, Error)]
pub enum ProfileApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("name is required")]
    MissingName,
    #[error("user not found")]
    NotFound,
    #[error("db error: {0}")]
    Db(#[from] users_repo::UsersRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>, ProfileApiError> {
    let pool = state.db.as_ref().ok_or(ProfileApiError::DbUnavailable)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(ProfileApiError::NotFound)?;
    Ok(Json(ProfileResponse {
        user: public_user(&user),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ProfileApiError> {
    let pool = state.db.as_ref().ok_or(ProfileApiError::DbUnavailable)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ProfileApiError::MissingName);
    }
    let avatar_url = payload
        .avatar_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let user = users_repo::update_profile(pool, current.id, name, avatar_url)
        .await?
        .ok_or(ProfileApiError::NotFound)?;
    Ok(Json(ProfileResponse {
        user: public_user(&user),
    }))
}

impl IntoResponse for ProfileApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ProfileApiError::MissingName => StatusCode::BAD_REQUEST,
            ProfileApiError::NotFound => StatusCode::NOT_FOUND,
            ProfileApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
