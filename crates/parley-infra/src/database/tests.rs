use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use parley_core::domain::{Comment, Post};
use parley_core::error::RepoError;
use parley_core::ports::{BaseRepository, CommentRepository};

use crate::database::entity::{comment, post, post_tag};
use crate::database::postgres_repo::{PostgresCommentRepository, PostgresPostRepository};

fn post_model(id: Uuid, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: title.to_owned(),
        content: "Content".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn comment_model(post_id: Uuid, parent_id: Option<Uuid>, content: &str) -> comment::Model {
    let now = Utc::now();
    comment::Model {
        id: Uuid::new_v4(),
        post_id,
        author_id: Uuid::new_v4(),
        parent_id,
        content: content.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_attaches_tags() {
    let post_id = Uuid::new_v4();
    let stored = post_model(post_id, "Test Post");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .append_query_results([vec![
            post_tag::Model {
                post_id,
                name: "rust".to_owned(),
            },
            post_tag::Model {
                post_id,
                name: "async".to_owned(),
            },
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let found: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = found.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, stored.author_id);
    assert_eq!(post.tags.into_iter().collect::<Vec<_>>(), vec!["async", "rust"]);
}

#[tokio::test]
async fn test_find_missing_post_skips_tag_lookup() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let found: Option<Post> = repo.find_by_id(Uuid::new_v4()).await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_insert_tagged_post_keeps_tags() {
    let post_id = Uuid::new_v4();
    let stored = post_model(post_id, "Tagged");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = Post::from(stored)
        .with_tags(["rust".to_string(), "web".to_string()].into_iter().collect());

    let saved: Post = repo.insert(post).await.unwrap();

    assert_eq!(saved.id, post_id);
    assert!(saved.has_tag("rust"));
    assert!(saved.has_tag("web"));
}

#[tokio::test]
async fn test_find_comments_by_post_maps_parents() {
    let post_id = Uuid::new_v4();
    let root = comment_model(post_id, None, "root");
    let reply = comment_model(post_id, Some(root.id), "reply");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![root.clone(), reply.clone()]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let comments = repo.find_by_post(post_id).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, root.id);
    assert!(comments[0].is_root());
    assert_eq!(comments[1].parent_id, Some(root.id));
    assert_eq!(comments[1].content, "reply");
}

#[tokio::test]
async fn test_comments_break_timestamp_ties_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    repo.find_by_post(Uuid::new_v4()).await.unwrap();

    let log = format!("{:?}", repo.db.into_transaction_log());
    let order = r#"ORDER BY \"comments\".\"created_at\" ASC, \"comments\".\"id\" ASC"#;
    assert!(log.contains(order), "{log}");
}

#[tokio::test]
async fn test_insert_comment_returns_stored_row() {
    let post_id = Uuid::new_v4();
    let stored = comment_model(post_id, None, "hello");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comment = Comment::from(stored.clone());

    let saved: Comment = repo.insert(comment).await.unwrap();

    assert_eq!(saved.id, stored.id);
    assert_eq!(saved.content, "hello");
}

#[tokio::test]
async fn test_update_comment_keeps_identity() {
    let post_id = Uuid::new_v4();
    let mut stored = comment_model(post_id, None, "edited");
    stored.updated_at = (Utc::now() + TimeDelta::seconds(5)).into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let saved: Comment = repo.update(Comment::from(stored.clone())).await.unwrap();

    assert_eq!(saved.id, stored.id);
    assert_eq!(saved.content, "edited");
    assert!(saved.updated_at > saved.created_at);
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let result = BaseRepository::<Comment, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_delete_post_succeeds() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(result.is_ok());
}
