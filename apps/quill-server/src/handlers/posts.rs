//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{AuthorRef, NewPost, Post, PostPatch};
use quill_core::pagination::{Page, PageRequest};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatePostRequest, PageQuery, PageResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn page_response(page: Page<Post>) -> PageResponse<Post> {
    PageResponse {
        total_pages: page.total_pages(),
        items: page.items,
        total_count: page.total_count,
        page: page.page,
        page_size: page.page_size,
    }
}

fn post_not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("Post {id} not found"))
}

/// A missing post is a 404 here, ahead of the gateway's own check.
pub(super) async fn require_post(state: &AppState, id: Uuid) -> AppResult<()> {
    match state.blog.find_post_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(post_not_found(id)),
    }
}

async fn list_for(state: &AppState, author_id: Uuid, query: PageQuery) -> AppResult<HttpResponse> {
    let request = PageRequest::from_query(query.page, query.page_size)?;
    let page = state.blog.list_posts(author_id, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(page))))
}

/// GET /api/posts - the caller's own posts.
pub async fn list_own(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    list_for(&state, identity.user_id, query.into_inner()).await
}

/// GET /api/authors/{author_id}/posts
pub async fn list_by_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    list_for(&state, path.into_inner(), query.into_inner()).await
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .blog
        .find_post_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/blog/{author}/{slug}
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (author, slug) = path.into_inner();
    let post = state
        .blog
        .find_post_by_slug(&AuthorRef::parse(&author), &slug)
        .await?
        .ok_or_else(|| post_not_found(format!("{author}/{slug}")))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = NewPost {
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        slug: req.slug,
    };
    let post = state.blog.create_post(&identity.session(), draft).await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    require_post(&state, id).await?;

    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        image_url: req.image_url,
        slug: req.slug,
    };
    let post = state
        .blog
        .update_post(&identity.session(), id, patch)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.blog.delete_post(&identity.session(), id).await?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
