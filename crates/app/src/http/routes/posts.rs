use std::collections::HashMap;

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::http::middleware::session::CurrentUser;
use crate::http::routes::comments::comment_from_record;
use crate::state::AppState;
use pinboard_core::domain::comments::{assemble, truncated_view, Comment};
use pinboard_core::domain::feed::{Pagination, Post, PostAuthor, PostCounts};
use pinboard_core::error::CoreError;
use pinboard_core::types::content::Content;
use pinboard_infra::db::comments_repo::CommentRecord;
use pinboard_infra::db::posts_repo::{self, PostRecord};
use pinboard_infra::db::{comments_repo, likes_repo, users_repo};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub media: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct FeedPostView {
    #[serde(flatten)]
    pub post: Post,
    pub hidden_comments: usize,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPostView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Error)]
pub enum PostsApiError {
    #[error("db not configured")]
    DbUnavailable,
    #[error("{0}")]
    InvalidContent(#[from] CoreError),
    #[error("post not found")]
    NotFound,
    #[error("user not found")]
    UserMissing,
    #[error("not allowed to delete this post")]
    Forbidden,
    #[error("db error: {0}")]
    Posts(#[from] posts_repo::PostsRepoError),
    #[error("db error: {0}")]
    Comments(#[from] comments_repo::CommentsRepoError),
    #[error("db error: {0}")]
    Likes(#[from] likes_repo::LikesRepoError),
    #[error("db error: {0}")]
    Users(#[from] users_repo::UsersRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn list_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, PostsApiError> {
    let pool = state.db.as_ref().ok_or(PostsApiError::DbUnavailable)?;
    let (page, limit) = resolve_paging(
        &params,
        state.config.feed_page_size,
        state.config.feed_page_size_max,
    );
    let offset = i64::from(page - 1) * i64::from(limit);

    let records = posts_repo::list_posts(pool, i64::from(limit), offset).await?;
    let post_ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
    let mut comments_by_post = group_comments(comments_repo::list_for_posts(pool, &post_ids).await?);
    let mut likes_by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for entry in likes_repo::list_for_posts(pool, &post_ids).await? {
        likes_by_post.entry(entry.post_id).or_default().push(entry.user_id);
    }

    let posts = records
        .into_iter()
        .map(|record| {
            let id = record.id;
            let (post, hidden_comments) = build_post(
                record,
                comments_by_post.remove(&id).unwrap_or_default(),
                likes_by_post.remove(&id).unwrap_or_default(),
                false,
            );
            FeedPostView {
                post,
                hidden_comments,
            }
        })
        .collect();

    let total = posts_repo::count_posts(pool).await?;
    Ok(Json(FeedResponse {
        posts,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, PostsApiError> {
    let pool = state.db.as_ref().ok_or(PostsApiError::DbUnavailable)?;
    let record = posts_repo::find_post(pool, id)
        .await?
        .ok_or(PostsApiError::NotFound)?;
    let comments = comments_repo::list_for_post(pool, id).await?;
    let likes = likes_repo::list_user_ids(pool, id).await?;
    let (post, _) = build_post(record, comments, likes, true);
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Response, PostsApiError> {
    let pool = state.db.as_ref().ok_or(PostsApiError::DbUnavailable)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(PostsApiError::UserMissing)?;
    let content = Content::try_from(payload.content.as_str())?;
    let media = payload.media.unwrap_or_default();

    let (id, created_at) = posts_repo::insert_post(pool, user.id, content.as_str(), &media).await?;
    let post = Post {
        id,
        content: content.into_string(),
        media,
        author: PostAuthor {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
        },
        created_at,
        comments: Vec::new(),
        likes: Vec::new(),
        counts: PostCounts {
            comments: 0,
            likes: 0,
        },
    };
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, PostsApiError> {
    let pool = state.db.as_ref().ok_or(PostsApiError::DbUnavailable)?;
    let record = posts_repo::find_post(pool, id)
        .await?
        .ok_or(PostsApiError::NotFound)?;
    let user = users_repo::find_by_id(pool, current.id)
        .await?
        .ok_or(PostsApiError::UserMissing)?;
    if record.author_id != user.id && !user.is_admin() {
        return Err(PostsApiError::Forbidden);
    }
    let deleted = posts_repo::delete_post(pool, id).await?;
    Ok(Json(DeletedResponse { deleted }))
}

fn resolve_paging(params: &FeedParams, default_limit: u32, max_limit: u32) -> (u32, u32) {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(default_limit).clamp(1, max_limit);
    (page, limit)
}

fn group_comments(records: Vec<CommentRecord>) -> HashMap<Uuid, Vec<CommentRecord>> {
    let mut grouped: HashMap<Uuid, Vec<CommentRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.post_id).or_default().push(record);
    }
    grouped
}

/// Turns a post row plus its flat comment slice into the API shape. The
/// feed collapses each tree to a preview; the detail view keeps it whole.
fn build_post(
    record: PostRecord,
    comment_records: Vec<CommentRecord>,
    likes: Vec<Uuid>,
    reveal_all: bool,
) -> (Post, usize) {
    let flat: Vec<Comment> = comment_records
        .into_iter()
        .map(comment_from_record)
        .collect();
    let tree = assemble(flat);
    let preview = truncated_view(&tree, reveal_all);
    let post = Post {
        id: record.id,
        content: record.content,
        media: record.media,
        author: PostAuthor {
            id: record.author_id,
            name: record.author_name,
            email: record.author_email,
            avatar_url: record.author_avatar_url,
        },
        created_at: record.created_at,
        comments: preview.comments,
        likes,
        counts: PostCounts {
            comments: record.comments_count,
            likes: record.likes_count,
        },
    };
    (post, preview.hidden)
}

impl IntoResponse for PostsApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            PostsApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PostsApiError::InvalidContent(_) => StatusCode::BAD_REQUEST,
            PostsApiError::NotFound | PostsApiError::UserMissing => StatusCode::NOT_FOUND,
            PostsApiError::Forbidden => StatusCode::FORBIDDEN,
            PostsApiError::Posts(_)
            | PostsApiError::Comments(_)
            | PostsApiError::Likes(_)
            | PostsApiError::Users(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

    use super::{build_post, resolve_paging, FeedParams};
    use pinboard_infra::db::comments_repo::CommentRecord;
    use pinboard_infra::db::posts_repo::PostRecord;

    fn post_record(comments: i64, likes: i64) -> PostRecord {
        PostRecord {
            id: Uuid::from_u128(1),
            author_id: Uuid::from_u128(2),
            content: "Hello".to_string(),
            media: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            author_name: "ada".to_string(),
            author_email: "ada@example.com".to_string(),
            author_avatar_url: None,
            comments_count: comments,
            likes_count: likes,
        }
    }

    fn comment_record(id: u128, parent: Option<u128>) -> CommentRecord {
        CommentRecord {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(1),
            parent_id: parent.map(Uuid::from_u128),
            author_id: Uuid::from_u128(2),
            author_name: "ada".to_string(),
            author_avatar_url: None,
            content: "c".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, id as u32 % 60, 0).unwrap(),
        }
    }

    #[test]
    fn resolve_paging_applies_defaults_and_caps() {
        let params = FeedParams {
            page: None,
            limit: None,
        };
        assert_eq!(resolve_paging(&params, 10, 50), (1, 10));
        let params = FeedParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(resolve_paging(&params, 10, 50), (1, 50));
    }

    #[test]
    fn fresh_post_has_empty_counts() {
        let (post, hidden) = build_post(post_record(0, 0), Vec::new(), Vec::new(), false);
        assert_eq!(post.counts.comments, 0);
        assert_eq!(post.counts.likes, 0);
        assert!(post.media.is_empty());
        assert!(post.comments.is_empty());
        assert_eq!(hidden, 0);
    }

    #[test]
    fn feed_view_truncates_detail_view_does_not() {
        let records = vec![
            comment_record(10, None),
            comment_record(11, Some(10)),
            comment_record(12, None),
        ];
        let (post, hidden) = build_post(post_record(3, 0), records.clone(), Vec::new(), false);
        assert_eq!(post.comments.len(), 1);
        assert!(post.comments[0].replies.is_empty());
        assert_eq!(hidden, 2);

        let (post, hidden) = build_post(post_record(3, 0), records, Vec::new(), true);
        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[0].replies.len(), 1);
        assert_eq!(hidden, 0);
    }
}
