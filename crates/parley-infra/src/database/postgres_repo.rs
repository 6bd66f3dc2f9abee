//! PostgreSQL repository implementations.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use parley_core::domain::{Comment, Post, User};
use parley_core::error::RepoError;
use parley_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, update_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL post repository.
///
/// A post and its `post_tags` rows are written in one transaction.
pub struct PostgresPostRepository {
    db: DbConn,
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next();
            match first {
                Some(c) if local.chars().count() > 1 => format!("{c}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Ids of posts with a tag row matching `condition`.
fn tagged_post_ids(condition: SimpleExpr) -> SelectStatement {
    Query::select()
        .column(post_tag::Column::PostId)
        .from(PostTagEntity)
        .and_where(condition)
        .to_owned()
}

async fn insert_tags<C>(conn: &C, post_id: Uuid, tags: &BTreeSet<String>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if tags.is_empty() {
        return Ok(());
    }

    let rows = tags.iter().map(|name| post_tag::ActiveModel {
        post_id: Set(post_id),
        name: Set(name.clone()),
    });
    PostTagEntity::insert_many(rows).exec_without_returning(conn).await?;

    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Convert rows to posts with their tags attached, keeping row order.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let mut tags: HashMap<Uuid, BTreeSet<String>> = HashMap::new();
        for row in rows {
            tags.entry(row.post_id).or_default().insert(row.name);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let post_tags = tags.remove(&model.id).unwrap_or_default();
                Post::from(model).with_tags(post_tags)
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(self.with_tags(vec![model]).await?.pop())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let tags = post.tags.clone();
        let txn = self.db.begin().await.map_err(query_error)?;

        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(write_error)?;
        insert_tags(&txn, model.id, &tags).await.map_err(write_error)?;

        txn.commit().await.map_err(write_error)?;
        Ok(Post::from(model).with_tags(tags))
    }

    /// Rewrites the post row and replaces its tag rows.
    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let tags = post.tags.clone();
        let txn = self.db.begin().await.map_err(query_error)?;

        let model = post::ActiveModel::from(post)
            .update(&txn)
            .await
            .map_err(update_error)?;
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(model.id))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        insert_tags(&txn, model.id, &tags).await.map_err(write_error)?;

        txn.commit().await.map_err(write_error)?;
        Ok(Post::from(model).with_tags(tags))
    }

    /// Tags and comments are removed by the `ON DELETE CASCADE` foreign keys.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        self.with_tags(result).await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn search(&self, needle: &str) -> Result<Vec<Post>, RepoError> {
        let pattern = like_pattern(&needle.to_lowercase());

        let result = PostEntity::find()
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(&pattern))
                    .add(post::Column::Id.in_subquery(tagged_post_ids(
                        post_tag::Column::Name.like(pattern.as_str()),
                    ))),
            )
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        self.with_tags(result).await
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(
                post::Column::Id.in_subquery(tagged_post_ids(post_tag::Column::Name.eq(tag))),
            )
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        self.with_tags(result).await
    }
}

/// Ties on `created_at` fall back to `id`, so repeated reads agree.
#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_parent(&self, parent_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::ParentId.eq(parent_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_sure"), "%100\\%\\_sure%");
    }
}
