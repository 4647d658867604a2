//! Image upload and serving.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use quill_core::domain::{ImageKind, ImageUpload, ObjectPath};
use quill_shared::ApiResponse;
use quill_shared::dto::{ImageUploadQuery, ImageUploadResponse};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/images?kind=&file_name= with the raw image as the body.
pub async fn upload(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    req: HttpRequest,
    query: web::Query<ImageUploadQuery>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let kind: ImageKind = query.kind.parse()?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let upload = ImageUpload {
        kind,
        file_name: query.file_name,
        content_type,
        bytes: body.to_vec(),
    };
    let session = identity.session();
    let url = state.blog.upload_image(session.as_ref(), upload).await?;

    tracing::debug!(kind = kind.as_str(), url = %url, "Image stored");
    Ok(HttpResponse::Created().json(ApiResponse::ok(ImageUploadResponse { url })))
}

/// GET /storage/images/{path}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let path = ObjectPath::parse(&path.into_inner())?;
    let object = state.storage.download(&path).await?;

    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((header::CONTENT_SECURITY_POLICY, "sandbox"))
        .body(object.bytes))
}
