//! Discussion handlers. Every mutation answers with an outcome message
//! the client can show as-is.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use parley_core::domain::{Comment, CommentThread};
use parley_shared::ApiResponse;
use parley_shared::dto::{
    CommentContentRequest, CommentResponse, CreateCommentRequest, ThreadResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        parent_id: comment.parent_id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn thread_response(thread: CommentThread) -> ThreadResponse {
    ThreadResponse {
        comment: comment_response(thread.root),
        replies: thread.replies.into_iter().map(comment_response).collect(),
    }
}

/// GET /api/posts/{post_id}/comments
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let threads = state.discussion.list_for_post(path.into_inner()).await?;
    let body: Vec<ThreadResponse> = threads.into_iter().map(thread_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /api/posts/{post_id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let comment = state
        .discussion
        .create_comment(
            path.into_inner(),
            identity.principal_id,
            &req.content,
            req.parent_id,
        )
        .await?;

    let message = if comment.is_root() {
        "Your comment has been added."
    } else {
        "Your reply has been added."
    };

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        comment_response(comment),
        message,
    )))
}

/// GET /api/comments/{comment_id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comment = state.discussion.get_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(comment))))
}

/// PUT /api/comments/{comment_id}
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentContentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .discussion
        .edit_comment(path.into_inner(), identity.principal_id, &body.content)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        comment_response(comment),
        "Your comment has been updated.",
    )))
}

/// DELETE /api/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .discussion
        .delete_comment(path.into_inner(), identity.principal_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Your comment has been deleted.")))
}

/// GET /api/comments/{comment_id}/replies
pub async fn replies(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let replies = state.discussion.replies_to(path.into_inner()).await?;
    let body: Vec<CommentResponse> = replies.into_iter().map(comment_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /api/comments/{comment_id}/replies
pub async fn reply(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentContentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .discussion
        .reply_to(path.into_inner(), identity.principal_id, &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        comment_response(comment),
        "Your reply has been added.",
    )))
}
