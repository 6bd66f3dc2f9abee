use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a post, optionally replying to another comment on the same post.
///
/// Comments form an arena keyed by `id`; the tree is only ever expressed
/// through `parent_id` and rebuilt at query time (see [`super::build_threads`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment with generated ID and matching timestamps.
    pub fn new(post_id: Uuid, author_id: Uuid, content: String, parent_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_authored_by(&self, principal_id: Uuid) -> bool {
        self.author_id == principal_id
    }

    /// Replace the body and refresh `updated_at`.
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }
}
