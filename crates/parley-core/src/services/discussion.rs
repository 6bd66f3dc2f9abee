//! Discussion tree manager: comment creation, author-only mutation and threaded retrieval.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, CommentThread, build_threads};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, CommentRepository, PostRepository};

use super::require_text;

/// Mediates every comment operation and enforces that only a comment's
/// author may edit or delete it.
///
/// Cascading deletes (post → comments, comment → replies) are the store's job.
#[derive(Clone)]
pub struct DiscussionManager {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl DiscussionManager {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// Attach a new comment to a post, optionally as a reply to `parent_id`.
    ///
    /// The parent must live on the same post; a parent from another post is
    /// reported as not found.
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        if let Some(parent_id) = parent_id {
            match self.comments.find_by_id(parent_id).await? {
                Some(parent) if parent.post_id == post_id => {}
                _ => return Err(DomainError::not_found("comment", parent_id)),
            }
        }

        let content = require_text("content", content)?;
        let inserted = self
            .comments
            .insert(Comment::new(post_id, author_id, content, parent_id))
            .await;
        let comment = match inserted {
            Ok(comment) => comment,
            Err(RepoError::Constraint(reason)) => {
                return Err(self.vanished_reference(post_id, parent_id, reason).await);
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            comment_id = %comment.id,
            post_id = %post_id,
            author_id = %author_id,
            reply = parent_id.is_some(),
            "Comment created"
        );

        Ok(comment)
    }

    /// Reply to an existing comment; the post is taken from the parent.
    pub async fn reply_to(
        &self,
        parent_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let parent = self.get_comment(parent_id).await?;
        self.create_comment(parent.post_id, author_id, content, Some(parent.id))
            .await
    }

    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        requester_id: Uuid,
        new_content: &str,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.owned_comment(comment_id, requester_id).await?;
        let content = require_text("content", new_content)?;

        comment.edit(content);
        let comment = self.comments.update(comment).await?;

        tracing::info!(comment_id = %comment_id, "Comment edited");
        Ok(comment)
    }

    /// Delete a comment and, through the store, every reply beneath it.
    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), DomainError> {
        let comment = self.owned_comment(comment_id, requester_id).await?;
        self.comments.delete(comment.id).await?;

        tracing::info!(comment_id = %comment_id, post_id = %comment.post_id, "Comment deleted");
        Ok(())
    }

    /// Root comments of a post, each with its direct replies, oldest first.
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentThread>, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        let comments = self.comments.find_by_post(post_id).await?;
        tracing::debug!(post_id = %post_id, count = comments.len(), "Loaded comments for post");

        Ok(build_threads(comments))
    }

    /// Direct replies to a comment, oldest first. Callers walk deeper levels
    /// by asking again for each reply.
    pub async fn replies_to(&self, comment_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.get_comment(comment_id).await?;

        let mut replies = self.comments.find_by_parent(comment_id).await?;
        replies.sort_by_key(|c| c.created_at);
        Ok(replies)
    }

    pub async fn get_comment(&self, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    /// The store rejected an insert whose post and parent were present a
    /// moment earlier. Report whichever of them is gone as not found.
    async fn vanished_reference(
        &self,
        post_id: Uuid,
        parent_id: Option<Uuid>,
        reason: String,
    ) -> DomainError {
        tracing::debug!(post_id = %post_id, reason = %reason, "Comment insert hit a foreign key");

        match self.posts.find_by_id(post_id).await {
            Ok(None) => DomainError::not_found("post", post_id),
            Ok(Some(_)) => match parent_id {
                Some(parent_id) => DomainError::not_found("comment", parent_id),
                None => RepoError::Constraint(reason).into(),
            },
            Err(e) => e.into(),
        }
    }

    async fn owned_comment(
        &self,
        comment_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self.get_comment(comment_id).await?;

        if !comment.is_authored_by(requester_id) {
            tracing::warn!(
                comment_id = %comment_id,
                requester_id = %requester_id,
                "Rejected comment mutation by non-author"
            );
            return Err(DomainError::Forbidden("comment"));
        }

        Ok(comment)
    }
}
