use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::http::middleware::session::CurrentUser;
use crate::state::AppState;
use pinboard_core::domain::comments::{assemble, count_all, Comment, CommentAuthor};
use pinboard_core::error::CoreError;
use pinboard_core::types::content::Content;
use pinboard_infra::db::comments_repo::{self, CommentRecord};
use pinboard_infra::db::{posts_repo, users_repo};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CommentThreadResponse {
    pub post_id: Uuid,
    pub total: usize,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Error)]
pub enum CommentsApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("{0}")]
    InvalidContent(#[from] CoreError),
    #[error("post not found")]
    PostNotFound,
    #[error("parent comment not found")]
    ParentNotFound,
    #[error("comment not found")]
    NotFound,
    #[error("user not found")]
    UserMissing,
    #[error("not allowed to delete this comment")]
    Forbidden,
    #[error("db error: {0}")]
    Db(#[from] comments_repo::CommentsRepoError),
    #[error("db error: {0}")]
    Posts(#[from] posts_repo::PostsRepoError),
    #[error("db error: {0}")]
    Users(#[from] users_repo::UsersRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<CommentThreadResponse>, CommentsApiError> {
    let pool = state.db.as_ref().ok_or(CommentsApiError::DbUnavailable)?;
    let records = comments_repo::list_for_post(pool, post_id).await?;
    let flat: Vec<Comment> = records.into_iter().map(comment_from_record).collect();
    let comments = assemble(flat);
    Ok(Json(CommentThreadResponse {
        post_id,
        total: count_all(&comments),
        comments,
    }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Response, CommentsApiError> {
    let pool = state.db.as_ref().ok_or(CommentsApiError::DbUnavailable)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(CommentsApiError::UserMissing)?;
    posts_repo::find_post(pool, post_id)
        .await?
        .ok_or(CommentsApiError::PostNotFound)?;
    let content = Content::try_from(payload.content.as_str())?;
    if let Some(parent_id) = payload.parent_id {
        comments_repo::find_comment(pool, parent_id)
            .await?
            .ok_or(CommentsApiError::ParentNotFound)?;
    }

    let (id, created_at) =
        comments_repo::insert_comment(pool, post_id, payload.parent_id, user.id, content.as_str())
            .await?;
    let comment = Comment {
        id,
        post_id,
        parent_id: payload.parent_id,
        author: CommentAuthor {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
        },
        content: content.into_string(),
        created_at,
        replies: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, CommentsApiError> {
    let pool = state.db.as_ref().ok_or(CommentsApiError::DbUnavailable)?;
    let comment = comments_repo::find_comment(pool, id)
        .await?
        .ok_or(CommentsApiError::NotFound)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(CommentsApiError::UserMissing)?;
    if comment.author_id != user.id && !user.is_admin() {
        return Err(CommentsApiError::Forbidden);
    }
    let deleted = comments_repo::delete_comment(pool, id).await?;
    Ok(Json(DeletedResponse { deleted }))
}

pub(crate) fn comment_from_record(record: CommentRecord) -> Comment {
    Comment {
        id: record.id,
        post_id: record.post_id,
        parent_id: record.parent_id,
        author: CommentAuthor {
            id: record.author_id,
            name: record.author_name,
            avatar_url: record.author_avatar_url,
        },
        content: record.content,
        created_at: record.created_at,
        replies: Vec::new(),
    }
}

impl IntoResponse for CommentsApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            CommentsApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            CommentsApiError::InvalidContent(_) => StatusCode::BAD_REQUEST,
            CommentsApiError::PostNotFound
            | CommentsApiError::ParentNotFound
            | CommentsApiError::NotFound
            | CommentsApiError::UserMissing => StatusCode::NOT_FOUND,
            CommentsApiError::Forbidden => StatusCode::FORBIDDEN,
            CommentsApiError::Db(_) | CommentsApiError::Posts(_) | CommentsApiError::Users(_) => {
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
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::comment_from_record;
    use pinboard_core::domain::comments::{assemble, count_all};
    use pinboard_infra::db::comments_repo::CommentRecord;

    fn record(id: u128, parent: Option<u128>, content: &str) -> CommentRecord {
        CommentRecord {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(500),
            parent_id: parent.map(Uuid::from_u128),
            author_id: Uuid::from_u128(9),
            author_name: "ada".to_string(),
            author_avatar_url: None,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, id as u32 % 60, 0).unwrap(),
        }
    }

    #[test]
    fn records_assemble_into_nested_tree() {
        let records = vec![
            record(1, None, "root"),
            record(2, Some(1), "reply"),
            record(3, Some(2), "deep"),
        ];
        let flat: Vec<_> = records.into_iter().map(comment_from_record).collect();
        let tree = assemble(flat);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].content, "deep");
        assert_eq!(count_all(&tree), 3);
    }

    #[test]
    fn conversion_keeps_parent_linkage() {
        let converted = comment_from_record(record(2, Some(1), "reply"));
        assert_eq!(converted.parent_id, Some(Uuid::from_u128(1)));
        assert!(converted.replies.is_empty());
    }
}
