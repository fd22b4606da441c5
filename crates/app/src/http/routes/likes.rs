use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::http::middleware::session::CurrentUser;
use crate::state::AppState;
use pinboard_infra::db::{likes_repo, posts_repo, users_repo};

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Error)]
pub enum LikesApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("post not found")]
    PostNotFound,
    #[error("user not found")]
    UserMissing,
    #[error("db error: {0}")]
    Likes(#[from] likes_repo::LikesRepoError),
    #[error("db error: {0}")]
    Posts(#[from] posts_repo::PostsRepoError),
    #[error("db error: {0}")]
    Users(#[from] users_repo::UsersRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Idempotent toggle keyed on (post, user): a like when none exists,
/// otherwise the existing like is withdrawn.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<LikeResponse>, LikesApiError> {
    let pool = state.db.as_ref().ok_or(LikesApiError::DbUnavailable)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(LikesApiError::UserMissing)?;
    posts_repo::find_post(pool, post_id)
        .await?
        .ok_or(LikesApiError::PostNotFound)?;

    let liked = if likes_repo::has_like(pool, post_id, user.id).await? {
        likes_repo::delete_like(pool, post_id, user.id).await?;
        false
    } else {
        likes_repo::insert_like(pool, post_id, user.id).await?;
        true
    };
    let likes_count = likes_repo::count_likes(pool, post_id).await?;
    Ok(Json(LikeResponse { liked, likes_count }))
}

impl IntoResponse for LikesApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            LikesApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            LikesApiError::PostNotFound | LikesApiError::UserMissing => StatusCode::NOT_FOUND,
            LikesApiError::Likes(_) | LikesApiError::Posts(_) | LikesApiError::Users(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
