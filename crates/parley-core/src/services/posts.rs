//! Publishing: the post lifecycle that discussions attach to.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{MAX_TAG_CHARS, MAX_TITLE_CHARS, Page, Post, normalize_tag};
use crate::error::DomainError;
use crate::ports::{BaseRepository, PostRepository};

use super::require_text;

/// Posts shown per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    page_size: u64,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self {
            posts,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn publish(
        &self,
        author_id: Uuid,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Post, DomainError> {
        let (title, content) = validate(title, content)?;
        let tags = normalize_tags(tags)?;
        let post = self
            .posts
            .insert(Post::new(author_id, title, content).with_tags(tags))
            .await?;

        tracing::info!(
            post_id = %post.id,
            author_id = %author_id,
            tags = post.tags.len(),
            "Post published"
        );
        Ok(post)
    }

    pub async fn get(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// Only the author may edit; the author itself is never reassigned.
    /// The tag set is replaced wholesale.
    pub async fn edit(
        &self,
        post_id: Uuid,
        requester_id: Uuid,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Post, DomainError> {
        let mut post = self.owned_post(post_id, requester_id).await?;
        let (title, content) = validate(title, content)?;
        let tags = normalize_tags(tags)?;

        post.revise(title, content, tags);
        let post = self.posts.update(post).await?;

        tracing::info!(post_id = %post_id, "Post edited");
        Ok(post)
    }

    /// Delete a post. Its comments go with it.
    pub async fn delete(&self, post_id: Uuid, requester_id: Uuid) -> Result<(), DomainError> {
        let post = self.owned_post(post_id, requester_id).await?;
        self.posts.delete(post.id).await?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Newest first. Page numbers start at 1; page 0 is read as page 1.
    pub async fn list(&self, page: u64) -> Result<Page<Post>, DomainError> {
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(self.page_size);

        let total = self.posts.count().await?;
        let items = self.posts.list_recent(offset, self.page_size).await?;

        Ok(Page {
            items,
            page,
            per_page: self.page_size,
            total,
        })
    }

    /// Case-insensitive match on title, content or tag names. A blank query finds nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.posts.search(&needle).await?;
        tracing::debug!(query = %needle, hits = results.len(), "Post search");
        Ok(results)
    }

    /// Posts carrying `tag`, compared case-insensitively. A blank tag finds nothing.
    pub async fn by_tag(&self, tag: &str) -> Result<Vec<Post>, DomainError> {
        let tag = normalize_tag(tag);
        if tag.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.posts.find_by_tag(&tag).await?;
        tracing::debug!(tag = %tag, hits = results.len(), "Posts by tag");
        Ok(results)
    }

    async fn owned_post(&self, post_id: Uuid, requester_id: Uuid) -> Result<Post, DomainError> {
        let post = self.get(post_id).await?;

        if !post.is_authored_by(requester_id) {
            tracing::warn!(post_id = %post_id, requester_id = %requester_id, "Rejected post mutation by non-author");
            return Err(DomainError::Forbidden("post"));
        }

        Ok(post)
    }
}

fn validate(title: &str, content: &str) -> Result<(String, String), DomainError> {
    let title = require_text("title", title)?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::InvalidInput(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    let content = require_text("content", content)?;
    Ok((title, content))
}

/// Normalize every tag, dropping blanks and duplicates.
fn normalize_tags(raw: &[String]) -> Result<BTreeSet<String>, DomainError> {
    let mut tags = BTreeSet::new();
    for tag in raw.iter().map(|t| normalize_tag(t)) {
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(DomainError::InvalidInput(format!(
                "tags must be at most {MAX_TAG_CHARS} characters"
            )));
        }
        tags.insert(tag);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_both_fields() {
        let (title, content) = validate("  Hello ", "\n body\n").unwrap();
        assert_eq!(title, "Hello");
        assert_eq!(content, "body");
    }

    #[test]
    fn test_validate_rejects_long_title() {
        let title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            validate(&title, "body"),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(validate(&"x".repeat(MAX_TITLE_CHARS), "body").is_ok());
    }

    #[test]
    fn test_normalize_tags_folds_case_and_drops_blanks() {
        let raw = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "  ".to_string(),
            "Web".to_string(),
        ];

        let tags = normalize_tags(&raw).unwrap();

        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["rust", "web"]);
    }

    #[test]
    fn test_normalize_tags_rejects_long_tag() {
        let raw = vec!["x".repeat(MAX_TAG_CHARS + 1)];
        assert!(matches!(
            normalize_tags(&raw),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        assert!(matches!(
            validate("Title", "   "),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
