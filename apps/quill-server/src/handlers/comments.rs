//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::NewComment;
use quill_shared::ApiResponse;
use quill_shared::dto::CreateCommentRequest;

use super::posts::require_post;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comments = state.blog.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// POST /api/posts/{id}/comments - open to anonymous readers.
pub async fn create(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    require_post(&state, post_id).await?;

    let req = body.into_inner();
    let draft = NewComment {
        post_id,
        author_name: req.author_name,
        author_email: req.author_email,
        content: req.content,
        image_url: req.image_url,
    };
    let session = identity.session();
    let comment = state.blog.create_comment(session.as_ref(), draft).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}
