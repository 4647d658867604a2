use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    AuthorRef, Comment, ImageUpload, NewComment, NewPost, Post, PostPatch, Session,
};
use crate::error::GatewayError;
use crate::pagination::PageRequest;
use crate::ports::BlogGateway;
use crate::validation::{validate_new_comment, validate_new_post, validate_post_patch};

use super::effects;
use super::event::{EventQueue, StoreEvent};
use super::state::Store;

/// Drives the store through a gateway on behalf of a page.
///
/// Loads settle their slice (`Ready` or `Failed`) and return nothing; read the
/// result from [`BlogController::store`]. Mutations return the gateway result
/// to the caller and, on success, apply the matching local event. Form-level
/// validation runs before the gateway is touched.
pub struct BlogController {
    gateway: Arc<dyn BlogGateway>,
    store: Store,
    queue: EventQueue,
}

impl BlogController {
    pub fn new(gateway: Arc<dyn BlogGateway>) -> Self {
        Self {
            gateway,
            store: Store::new(),
            queue: EventQueue::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn dispatch(&mut self, event: StoreEvent) {
        self.queue.push(event);
        let applied = self.store.drain(&mut self.queue);
        if applied == 0 {
            tracing::debug!("Discarded superseded fetch outcome");
        }
    }

    pub async fn load_posts(&mut self, author_id: Uuid, page: PageRequest) {
        let ticket = self.store.posts.begin();
        let event = effects::fetch_posts(self.gateway.as_ref(), ticket, author_id, page).await;
        self.dispatch(event);
    }

    pub async fn load_post_by_id(&mut self, id: Uuid) {
        let ticket = self.store.current_post.begin();
        let event = effects::fetch_post_by_id(self.gateway.as_ref(), ticket, id).await;
        self.dispatch(event);
    }

    pub async fn load_post_by_slug(&mut self, author: &AuthorRef, slug: &str) {
        let ticket = self.store.current_post.begin();
        let event = effects::fetch_post_by_slug(self.gateway.as_ref(), ticket, author, slug).await;
        self.dispatch(event);
    }

    pub async fn load_comments(&mut self, post_id: Uuid) {
        let ticket = self.store.comments.begin();
        let event = effects::fetch_comments(self.gateway.as_ref(), ticket, post_id).await;
        self.dispatch(event);
    }

    /// Detail view: the post and its thread, fetched concurrently.
    pub async fn open_post(&mut self, id: Uuid) {
        let post_ticket = self.store.current_post.begin();
        let comments_ticket = self.store.comments.begin();
        let gateway = self.gateway.as_ref();
        let (post, comments) = tokio::join!(
            effects::fetch_post_by_id(gateway, post_ticket, id),
            effects::fetch_comments(gateway, comments_ticket, id),
        );
        self.dispatch(post);
        self.dispatch(comments);
    }

    pub fn close_post(&mut self) {
        self.dispatch(StoreEvent::CurrentPostCleared);
        self.dispatch(StoreEvent::CommentsCleared);
    }

    pub async fn create_post(
        &mut self,
        session: &Session,
        draft: NewPost,
    ) -> Result<Post, GatewayError> {
        validate_new_post(&draft)?;
        let post = self.gateway.create_post(session, draft).await?;
        self.dispatch(StoreEvent::PostCreated(post.clone()));
        Ok(post)
    }

    pub async fn update_post(
        &mut self,
        session: &Session,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, GatewayError> {
        validate_post_patch(&patch)?;
        let post = self.gateway.update_post(session, id, patch).await?;
        self.dispatch(StoreEvent::PostUpdated(post.clone()));
        Ok(post)
    }

    pub async fn delete_post(&mut self, session: &Session, id: Uuid) -> Result<(), GatewayError> {
        self.gateway.delete_post(session, id).await?;
        self.dispatch(StoreEvent::PostDeleted(id));
        Ok(())
    }

    pub async fn create_comment(
        &mut self,
        session: Option<&Session>,
        draft: NewComment,
    ) -> Result<Comment, GatewayError> {
        validate_new_comment(&draft)?;
        let comment = self.gateway.create_comment(session, draft).await?;
        self.dispatch(StoreEvent::CommentCreated(comment.clone()));
        Ok(comment)
    }

    pub async fn upload_image(
        &self,
        session: Option<&Session>,
        upload: ImageUpload,
    ) -> Result<String, GatewayError> {
        upload.validate()?;
        if upload.kind.requires_session() && session.is_none() {
            return Err(GatewayError::login_required());
        }
        self.gateway.upload_image(session, upload).await
    }
}
