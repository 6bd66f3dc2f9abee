//! Publishing handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use parley_core::domain::Post;
use parley_shared::ApiResponse;
use parley_shared::dto::{PageQuery, PostPageResponse, PostRequest, PostResponse, SearchQuery};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        content: post.content,
        tags: post.tags.into_iter().collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// GET /api/posts?page=N
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list(query.page.unwrap_or(1)).await?;
    let has_next = page.has_next();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPageResponse {
        posts: page.items.into_iter().map(post_response).collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        has_next,
    })))
}

/// GET /api/posts/search?q=...
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let results = state.posts.search(&query.q).await?;
    let body: Vec<PostResponse> = results.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/posts/tags/{tag}
pub async fn by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let results = state.posts.by_tag(&path.into_inner()).await?;
    let body: Vec<PostResponse> = results.into_iter().map(post_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/posts/{post_id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts
pub async fn publish(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .publish(identity.principal_id, &body.title, &body.content, &body.tags)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        post_response(post),
        "Your post has been created successfully.",
    )))
}

/// PUT /api/posts/{post_id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .edit(
            path.into_inner(),
            identity.principal_id,
            &body.title,
            &body.content,
            &body.tags,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(post),
        "Your post has been updated successfully.",
    )))
}

/// DELETE /api/posts/{post_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), identity.principal_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "Your post has been deleted successfully.",
    )))
}
