//! In-memory store - used when no database is configured, and in tests.
//!
//! One `RwLock` guards all three tables so a cascading delete happens in a
//! single write section. Rows are kept in insertion order.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use parley_core::domain::{Comment, Post, User};
use parley_core::error::RepoError;
use parley_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    /// Remove the given comments and every reply beneath them.
    fn remove_comment_subtrees(&mut self, roots: impl IntoIterator<Item = Uuid>) -> usize {
        let mut doomed: HashSet<Uuid> = HashSet::new();
        let mut frontier: Vec<Uuid> = Vec::new();
        for id in roots {
            if doomed.insert(id) {
                frontier.push(id);
            }
        }

        while let Some(id) = frontier.pop() {
            for reply in self.comments.iter().filter(|c| c.parent_id == Some(id)) {
                if doomed.insert(reply.id) {
                    frontier.push(reply.id);
                }
            }
        }

        let before = self.comments.len();
        self.comments.retain(|c| !doomed.contains(&c.id));
        before - self.comments.len()
    }

    fn remove_posts(&mut self, doomed: &HashSet<Uuid>) {
        self.posts.retain(|p| !doomed.contains(&p.id));
        self.comments.retain(|c| !doomed.contains(&c.post_id));
    }
}

/// In-memory implementation of every repository port.
///
/// Note: data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn oldest_first(comments: &mut [Comment]) {
    comments.sort_by_key(|c| c.created_at);
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    /// Removes the user, their posts (with all comments on them) and their
    /// own comments (with all replies).
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(RepoError::NotFound);
        }

        let posts: HashSet<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.remove_posts(&posts);

        let authored: Vec<Uuid> = tables
            .comments
            .iter()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        tables.remove_comment_subtrees(authored);

        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == id) {
            return Err(RepoError::NotFound);
        }
        tables.remove_posts(&HashSet::from([id]));
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts = tables.posts.clone();
        newest_first(&mut posts);

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.len() as u64)
    }

    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        let needle = needle.to_lowercase();
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.matches(&needle))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.has_tag(tag))
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    /// Enforces the same foreign keys the database would: the post must
    /// exist, and so must the parent.
    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.iter().any(|c| c.id == comment.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        if let Some(parent_id) = comment.parent_id {
            if !tables.comments.iter().any(|c| c.id == parent_id) {
                return Err(RepoError::Constraint(format!(
                    "comment {parent_id} does not exist"
                )));
            }
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.iter().any(|c| c.id == id) {
            return Err(RepoError::NotFound);
        }
        let removed = tables.remove_comment_subtrees([id]);
        tracing::debug!(comment_id = %id, removed, "Deleted comment subtree");
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        oldest_first(&mut comments);
        Ok(comments)
    }

    async fn find_by_parent(&self, parent_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect();
        oldest_first(&mut comments);
        Ok(comments)
    }
}
