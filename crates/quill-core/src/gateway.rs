//! Gateway implementation running directly against repository and storage ports.
//!
//! This is what the backend executes for every request. Row-level policy lives
//! here too: only a post's owner may change or delete it, and a delete is
//! checked afterwards so that a silently ignored delete is reported.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AuthorRef, Comment, ImageUpload, NewComment, NewPost, ObjectPath, Post, PostPatch, Session,
    resolve_slug, slugify,
};
use crate::error::{DomainError, GatewayError, RepoError};
use crate::pagination::{Page, PageRequest};
use crate::ports::{
    BlogGateway, CommentRepository, ObjectStorage, PostRepository, StorageError, UserRepository,
};
use crate::validation::{validate_new_comment, validate_new_post, validate_post_patch};

/// [`BlogGateway`] over repositories and object storage.
#[derive(Clone)]
pub struct RepositoryGateway {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl RepositoryGateway {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
            storage,
        }
    }

    async fn resolve_author(&self, author: &AuthorRef) -> Result<Option<Uuid>, GatewayError> {
        match author {
            AuthorRef::Id(id) => Ok(Some(*id)),
            AuthorRef::Username(name) => Ok(self
                .users
                .find_by_username(name)
                .await?
                .map(|user| user.id)),
        }
    }

    async fn owned_post(&self, session: &Session, id: Uuid) -> Result<Post, GatewayError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| GatewayError::from(DomainError::NotFound {
                entity_type: "Post",
                id,
            }))?;

        if post.user_id != session.user_id {
            return Err(GatewayError::PermissionDenied(
                "You can only edit your own posts".to_string(),
            ));
        }
        Ok(post)
    }

    async fn ensure_slug_free(
        &self,
        user_id: Uuid,
        slug: &str,
        except: Option<Uuid>,
    ) -> Result<(), GatewayError> {
        match self.posts.find_by_slug(user_id, slug).await? {
            Some(existing) if Some(existing.id) != except => Err(GatewayError::Conflict(format!(
                "You already have a post with the slug '{slug}'"
            ))),
            _ => Ok(()),
        }
    }
}

fn storage_error(err: StorageError) -> GatewayError {
    match err {
        StorageError::AlreadyExists(path) => {
            GatewayError::Conflict(format!("An object already exists at {path}"))
        }
        other => GatewayError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl BlogGateway for RepositoryGateway {
    async fn list_posts(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, GatewayError> {
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(GatewayError::Validation(format!(
                "Unknown author {author_id}"
            )));
        }
        let result = self.posts.list_by_user(author_id, page).await?;
        tracing::debug!(
            author_id = %author_id,
            page = page.page(),
            returned = result.items.len(),
            total = result.total_count,
            "Listed posts"
        );
        Ok(result)
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, GatewayError> {
        Ok(self.posts.find_by_id(id).await?)
    }

    async fn find_post_by_slug(
        &self,
        author: &AuthorRef,
        slug: &str,
    ) -> Result<Option<Post>, GatewayError> {
        let Some(user_id) = self.resolve_author(author).await? else {
            return Ok(None);
        };
        Ok(self.posts.find_by_slug(user_id, &slugify(slug)).await?)
    }

    async fn create_post(&self, session: &Session, draft: NewPost) -> Result<Post, GatewayError> {
        validate_new_post(&draft)?;
        let slug = resolve_slug(&draft);
        self.ensure_slug_free(session.user_id, &slug, None).await?;

        let post = self.posts.insert(Post::new(session.user_id, draft, slug)).await?;
        tracing::info!(post_id = %post.id, user_id = %post.user_id, slug = %post.slug, "Post created");
        Ok(post)
    }

    async fn update_post(
        &self,
        session: &Session,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, GatewayError> {
        validate_post_patch(&patch)?;
        let mut post = self.owned_post(session, id).await?;

        if let Some(slug) = patch.slug.as_deref().map(slugify)
            && slug != post.slug
        {
            self.ensure_slug_free(session.user_id, &slug, Some(id)).await?;
        }

        post.apply(patch);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    async fn delete_post(&self, session: &Session, id: Uuid) -> Result<(), GatewayError> {
        let Some(post) = self.posts.find_by_id(id).await? else {
            return Ok(());
        };

        // Owner-only: someone else's post is left untouched and caught below.
        if post.user_id == session.user_id {
            match self.comments.delete_by_post(id).await {
                Ok(removed) => tracing::debug!(post_id = %id, removed, "Deleted post comments"),
                Err(e) => tracing::warn!(
                    post_id = %id,
                    error = %e,
                    "Failed to delete comments, deleting post anyway"
                ),
            }
            match self.posts.delete(id).await {
                Ok(()) | Err(RepoError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if self.posts.find_by_id(id).await?.is_some() {
            tracing::warn!(post_id = %id, user_id = %session.user_id, "Delete left the post in place");
            return Err(GatewayError::PermissionDenied(
                "The post was not deleted. You may not have permission to delete it.".to_string(),
            ));
        }

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, GatewayError> {
        Ok(self.comments.list_by_post(post_id).await?)
    }

    async fn create_comment(
        &self,
        session: Option<&Session>,
        draft: NewComment,
    ) -> Result<Comment, GatewayError> {
        validate_new_comment(&draft)?;
        if self.posts.find_by_id(draft.post_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "Post",
                id: draft.post_id,
            }
            .into());
        }

        let comment = Comment::new(draft, session.map(|s| s.user_id));
        let comment = self.comments.insert(comment).await?;
        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "Comment created");
        Ok(comment)
    }

    async fn upload_image(
        &self,
        session: Option<&Session>,
        upload: ImageUpload,
    ) -> Result<String, GatewayError> {
        upload.validate()?;
        if upload.kind.requires_session() && session.is_none() {
            return Err(GatewayError::login_required());
        }

        let path =
            ObjectPath::for_upload(upload.kind, session.map(|s| s.user_id), &upload.file_name)?;
        self.storage
            .upload(&path, upload.bytes, &upload.content_type)
            .await
            .map_err(storage_error)?;

        let url = self.storage.public_url(&path);
        tracing::info!(path = %path, kind = upload.kind.as_str(), "Image uploaded");
        Ok(url)
    }
}
