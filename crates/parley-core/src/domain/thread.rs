use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Comment;

/// A root comment paired with its direct replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    pub root: Comment,
    pub replies: Vec<Comment>,
}

/// Group the comments of one post into one-level threads.
///
/// Roots and replies both come out in ascending `created_at` order; equal
/// timestamps keep their input order. Comments nested two or more levels
/// deep are dropped, since their parent is a reply rather than a root.
pub fn build_threads(mut comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.sort_by_key(|c| c.created_at);

    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match comment.parent_id {
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    roots
        .into_iter()
        .map(|root| {
            let replies = children.remove(&root.id).unwrap_or_default();
            CommentThread { root, replies }
        })
        .collect()
}
