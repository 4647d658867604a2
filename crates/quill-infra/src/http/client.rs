//! `BlogGateway` and `AuthGateway` over the Quill HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use quill_core::domain::{
    AuthorRef, Comment, ImageUpload, NewComment, NewPost, Post, PostPatch, Session,
};
use quill_core::error::GatewayError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{AuthGateway, BlogGateway};
use quill_core::validation::{LoginForm, RegistrationForm};
use quill_shared::dto::{
    AuthResponse, CreateCommentRequest, CreatePostRequest, ImageUploadResponse, LoginRequest,
    PageResponse, RegisterUserRequest, UpdatePostRequest, UserResponse,
};
use quill_shared::{ApiResponse, ErrorResponse};

/// Remote gateway. Every call maps the server's problem documents back onto
/// [`GatewayError`]; a failed connection is [`GatewayError::Unavailable`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Validation(format!("Invalid API URL '{base_url}': {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// `{base}/api/{segments...}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Validation(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn authorized(request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        match session {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request,
        }
    }

    async fn dispatch(request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request to backend failed");
            GatewayError::Unavailable(e.to_string())
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(problem(response).await)
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
        let response = Self::dispatch(request).await?;
        decode(response).await
    }

    /// Like [`Self::send`], but a 404 is `Ok(None)`.
    async fn send_optional<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<Option<T>, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(response).await.map(Some),
            _ => Err(problem(response).await),
        }
    }

    /// The account behind a session, as the server sees it.
    pub async fn current_user(&self, session: &Session) -> Result<UserResponse, GatewayError> {
        let url = self.endpoint(&["auth", "me"])?;
        Self::send(Self::authorized(self.client.get(url), Some(session))).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let body: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| GatewayError::Rejected(format!("Unexpected response from backend: {e}")))?;
    body.data
        .ok_or_else(|| GatewayError::Rejected("Backend returned an empty response".to_string()))
}

async fn problem(response: Response) -> GatewayError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(problem) => problem.message().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    tracing::debug!(status = status.as_u16(), message = %message, "Backend rejected request");
    error_for_status(status, message)
}

fn error_for_status(status: StatusCode, message: String) -> GatewayError {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => GatewayError::Validation(message),
        StatusCode::UNAUTHORIZED => GatewayError::Unauthenticated(message),
        StatusCode::FORBIDDEN => GatewayError::PermissionDenied(message),
        StatusCode::CONFLICT => GatewayError::Conflict(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::Unavailable(message)
        }
        _ => GatewayError::Rejected(message),
    }
}

fn session_from(auth: AuthResponse) -> Session {
    Session {
        user_id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
        expires_at: auth.expires_at,
    }
}

#[async_trait]
impl BlogGateway for HttpGateway {
    async fn list_posts(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, GatewayError> {
        let url = self.endpoint(&["authors", &author_id.to_string(), "posts"])?;
        let request = self.client.get(url).query(&[
            ("page", page.page()),
            ("page_size", page.page_size()),
        ]);
        let body: PageResponse<Post> = Self::send(request).await?;
        Ok(Page {
            items: body.items,
            total_count: body.total_count,
            page: body.page,
            page_size: body.page_size,
        })
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, GatewayError> {
        let url = self.endpoint(&["posts", &id.to_string()])?;
        Self::send_optional(self.client.get(url)).await
    }

    async fn find_post_by_slug(
        &self,
        author: &AuthorRef,
        slug: &str,
    ) -> Result<Option<Post>, GatewayError> {
        let url = self.endpoint(&["blog", &author.to_string(), slug])?;
        Self::send_optional(self.client.get(url)).await
    }

    async fn create_post(&self, session: &Session, post: NewPost) -> Result<Post, GatewayError> {
        let url = self.endpoint(&["posts"])?;
        let body = CreatePostRequest {
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            slug: post.slug,
        };
        Self::send(Self::authorized(self.client.post(url), Some(session)).json(&body)).await
    }

    async fn update_post(
        &self,
        session: &Session,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, GatewayError> {
        let url = self.endpoint(&["posts", &id.to_string()])?;
        let body = UpdatePostRequest {
            title: patch.title,
            content: patch.content,
            image_url: patch.image_url,
            slug: patch.slug,
        };
        Self::send(Self::authorized(self.client.patch(url), Some(session)).json(&body)).await
    }

    async fn delete_post(&self, session: &Session, id: Uuid) -> Result<(), GatewayError> {
        let url = self.endpoint(&["posts", &id.to_string()])?;
        Self::dispatch(Self::authorized(self.client.delete(url), Some(session))).await?;

        // A 2xx is not proof: check the post is really gone.
        if self.find_post_by_id(id).await?.is_some() {
            tracing::warn!(post_id = %id, "Backend acknowledged delete but the post remains");
            return Err(GatewayError::PermissionDenied(
                "The post was not deleted. You may not have permission to delete it.".to_string(),
            ));
        }
        Ok(())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, GatewayError> {
        let url = self.endpoint(&["posts", &post_id.to_string(), "comments"])?;
        Self::send(self.client.get(url)).await
    }

    async fn create_comment(
        &self,
        session: Option<&Session>,
        comment: NewComment,
    ) -> Result<Comment, GatewayError> {
        let url = self.endpoint(&["posts", &comment.post_id.to_string(), "comments"])?;
        let body = CreateCommentRequest {
            author_name: comment.author_name,
            author_email: comment.author_email,
            content: comment.content,
            image_url: comment.image_url,
        };
        Self::send(Self::authorized(self.client.post(url), session).json(&body)).await
    }

    async fn upload_image(
        &self,
        session: Option<&Session>,
        upload: ImageUpload,
    ) -> Result<String, GatewayError> {
        let url = self.endpoint(&["images"])?;
        let request = self
            .client
            .post(url)
            .query(&[("kind", upload.kind.as_str()), ("file_name", upload.file_name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, upload.content_type)
            .body(upload.bytes);
        let body: ImageUploadResponse = Self::send(Self::authorized(request, session)).await?;
        Ok(body.url)
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn register(&self, form: RegistrationForm) -> Result<Session, GatewayError> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = RegisterUserRequest {
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
        };
        let auth: AuthResponse = Self::send(self.client.post(url).json(&body)).await?;
        Ok(session_from(auth))
    }

    async fn login(&self, form: LoginForm) -> Result<Session, GatewayError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = LoginRequest {
            email: form.email,
            password: form.password,
        };
        let auth: AuthResponse = Self::send(self.client.post(url).json(&body)).await?;
        Ok(session_from(auth))
    }
}
