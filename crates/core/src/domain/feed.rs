use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::comments::Comment;

#[derive(Debug, Clone, Serialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PostCounts {
    pub comments: i64,
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub media: Vec<String>,
    pub author: PostAuthor,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Uuid>,
    pub counts: PostCounts,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + i64::from(limit) - 1) / i64::from(limit)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(1, 10, 31);
        assert_eq!(p.total_pages, 4);
    }

    #[test]
    fn pagination_exact_multiple() {
        let p = Pagination::new(2, 10, 30);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn pagination_empty_feed_has_no_pages() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
    }
}
