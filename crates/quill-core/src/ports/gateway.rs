//! The remote data gateway: every operation a page can ask of the backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AuthorRef, Comment, ImageUpload, NewComment, NewPost, Post, PostPatch, Session,
};
use crate::error::GatewayError;
use crate::pagination::{Page, PageRequest};
use crate::validation::{LoginForm, RegistrationForm};

/// Blog data gateway.
///
/// Implementations either run against repositories directly
/// ([`RepositoryGateway`](crate::RepositoryGateway)) or against a remote API.
/// Access control is the backend's business; the session is passed through as
/// an opaque capability.
#[async_trait]
pub trait BlogGateway: Send + Sync {
    /// An author's posts, newest first.
    async fn list_posts(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, GatewayError>;

    /// `Ok(None)` when the post does not exist.
    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, GatewayError>;

    /// `Ok(None)` when the author or the slug is unknown.
    async fn find_post_by_slug(
        &self,
        author: &AuthorRef,
        slug: &str,
    ) -> Result<Option<Post>, GatewayError>;

    async fn create_post(&self, session: &Session, post: NewPost) -> Result<Post, GatewayError>;

    async fn update_post(
        &self,
        session: &Session,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, GatewayError>;

    /// Delete a post and its comments.
    ///
    /// Fails with [`GatewayError::PermissionDenied`] if the post still exists
    /// afterwards; deleting an absent post succeeds.
    async fn delete_post(&self, session: &Session, id: Uuid) -> Result<(), GatewayError>;

    /// A post's comments, newest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, GatewayError>;

    async fn create_comment(
        &self,
        session: Option<&Session>,
        comment: NewComment,
    ) -> Result<Comment, GatewayError>;

    /// Store an image and return its public URL.
    async fn upload_image(
        &self,
        session: Option<&Session>,
        upload: ImageUpload,
    ) -> Result<String, GatewayError>;
}

/// Account gateway: registration and login.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn register(&self, form: RegistrationForm) -> Result<Session, GatewayError>;

    async fn login(&self, form: LoginForm) -> Result<Session, GatewayError>;
}
