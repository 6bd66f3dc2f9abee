use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, together with everything that depends on it.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Deleting a post must also delete every comment attached to it.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Newest first, skipping `offset` posts.
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Posts whose title, content or a tag name contains `needle`, ignoring
    /// case. Newest first.
    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError>;

    /// Posts carrying exactly the normalized tag `tag`. Newest first.
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
///
/// Deleting a comment must also delete its replies, transitively.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Every comment on a post at any depth, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Direct replies to a comment, oldest first.
    async fn find_by_parent(&self, parent_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
