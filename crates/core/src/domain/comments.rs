use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author: CommentAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Comment>,
}

/// The visible slice of a comment tree plus how many comments it hides.
#[derive(Debug, Clone, Serialize)]
pub struct CommentPreview {
    pub comments: Vec<Comment>,
    pub hidden: usize,
}

/// Appends `reply` under the node whose id is `parent_id`, or to the
/// top level when `parent_id` is `None`. Reply lists are append-only, so
/// arrival order is display order. Returns `false` and leaves the tree
/// untouched when no node matches.
pub fn insert_reply(tree: &mut Vec<Comment>, parent_id: Option<Uuid>, reply: Comment) -> bool {
    let Some(parent_id) = parent_id else {
        tree.push(reply);
        return true;
    };
    match find_node(tree, parent_id) {
        Some(parent) => {
            parent.replies.push(reply);
            true
        }
        None => false,
    }
}

/// Total number of comments, nested replies included.
pub fn count_all(tree: &[Comment]) -> usize {
    tree.iter().map(|node| 1 + count_all(&node.replies)).sum()
}

/// Collapses a tree for feed display: the first top-level comment with
/// its replies stripped, plus the count of everything hidden. With
/// `reveal_all` the tree passes through whole.
pub fn truncated_view(tree: &[Comment], reveal_all: bool) -> CommentPreview {
    if reveal_all {
        return CommentPreview {
            comments: tree.to_vec(),
            hidden: 0,
        };
    }
    let Some(first) = tree.first() else {
        return CommentPreview {
            comments: Vec::new(),
            hidden: 0,
        };
    };
    let mut visible = first.clone();
    visible.replies = Vec::new();
    CommentPreview {
        hidden: count_all(tree) - 1,
        comments: vec![visible],
    }
}

/// Builds a tree from a flat, creation-ordered list. Parents are created
/// before their replies, so a single pass through `insert_reply` keyed on
/// each comment's own parent id reconstructs the nesting. A comment whose
/// parent is absent from the list is dropped.
pub fn assemble(flat: Vec<Comment>) -> Vec<Comment> {
    let mut tree = Vec::with_capacity(flat.len());
    for comment in flat {
        let parent_id = comment.parent_id;
        insert_reply(&mut tree, parent_id, comment);
    }
    tree
}

fn find_node(tree: &mut [Comment], id: Uuid) -> Option<&mut Comment> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&mut node.replies, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::{assemble, count_all, insert_reply, truncated_view, Comment, CommentAuthor};

    fn comment(id: u128, parent: Option<u128>, content: &str) -> Comment {
        Comment {
            id: Uuid::from_u128(id),
            post_id: Uuid::from_u128(1000),
            parent_id: parent.map(Uuid::from_u128),
            author: CommentAuthor {
                id: Uuid::from_u128(7),
                name: "ada".to_string(),
                avatar_url: None,
            },
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, id as u32 % 60, 0).unwrap(),
            replies: Vec::new(),
        }
    }

    #[test]
    fn insert_reply_appends_top_level_without_parent() {
        let mut tree = Vec::new();
        assert!(insert_reply(&mut tree, None, comment(1, None, "first")));
        assert!(insert_reply(&mut tree, None, comment(2, None, "second")));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].content, "first");
        assert_eq!(tree[1].content, "second");
    }

    #[test]
    fn insert_reply_locates_nested_parent() {
        let mut tree = vec![comment(1, None, "root")];
        assert!(insert_reply(
            &mut tree,
            Some(Uuid::from_u128(1)),
            comment(2, Some(1), "reply"),
        ));
        assert!(insert_reply(
            &mut tree,
            Some(Uuid::from_u128(2)),
            comment(3, Some(2), "deep"),
        ));
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].content, "deep");
    }

    #[test]
    fn insert_reply_grows_count_by_one_when_parent_exists() {
        let mut tree = vec![comment(1, None, "root"), comment(2, None, "other")];
        insert_reply(&mut tree, Some(Uuid::from_u128(2)), comment(3, Some(2), "r"));
        let before = count_all(&tree);
        assert!(insert_reply(
            &mut tree,
            Some(Uuid::from_u128(3)),
            comment(4, Some(3), "rr"),
        ));
        assert_eq!(count_all(&tree), before + 1);
    }

    #[test]
    fn insert_reply_missing_parent_leaves_tree_unchanged() {
        let mut tree = vec![comment(1, None, "root")];
        let before = count_all(&tree);
        assert!(!insert_reply(
            &mut tree,
            Some(Uuid::from_u128(99)),
            comment(2, Some(99), "orphan"),
        ));
        assert_eq!(count_all(&tree), before);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn count_all_includes_nested_replies() {
        let mut tree = vec![comment(1, None, "a"), comment(2, None, "b")];
        insert_reply(&mut tree, Some(Uuid::from_u128(1)), comment(3, Some(1), "a1"));
        insert_reply(&mut tree, Some(Uuid::from_u128(3)), comment(4, Some(3), "a1a"));
        assert_eq!(count_all(&tree), 4);
    }

    #[test]
    fn truncated_view_hides_everything_past_the_first_comment() {
        let mut tree = vec![comment(1, None, "a"), comment(2, None, "b")];
        insert_reply(&mut tree, Some(Uuid::from_u128(1)), comment(3, Some(1), "a1"));
        let preview = truncated_view(&tree, false);
        assert_eq!(preview.comments.len(), 1);
        assert!(preview.comments[0].replies.is_empty());
        assert_eq!(preview.hidden + count_all(&preview.comments), count_all(&tree));
    }

    #[test]
    fn truncated_view_reveal_all_passes_through() {
        let mut tree = vec![comment(1, None, "a")];
        insert_reply(&mut tree, Some(Uuid::from_u128(1)), comment(2, Some(1), "a1"));
        let preview = truncated_view(&tree, true);
        assert_eq!(preview.hidden, 0);
        assert_eq!(count_all(&preview.comments), count_all(&tree));
    }

    #[test]
    fn truncated_view_of_empty_tree_is_empty() {
        let preview = truncated_view(&[], false);
        assert!(preview.comments.is_empty());
        assert_eq!(preview.hidden, 0);
    }

    #[test]
    fn assemble_nests_replies_under_their_parents() {
        let flat = vec![
            comment(1, None, "root"),
            comment(2, Some(1), "reply"),
            comment(3, Some(2), "deep"),
            comment(4, None, "second root"),
        ];
        let tree = assemble(flat);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].content, "deep");
        assert_eq!(count_all(&tree), 4);
    }

    #[test]
    fn assemble_drops_comments_with_unknown_parents() {
        let flat = vec![comment(1, None, "root"), comment(2, Some(77), "orphan")];
        let tree = assemble(flat);
        assert_eq!(count_all(&tree), 1);
    }
}
