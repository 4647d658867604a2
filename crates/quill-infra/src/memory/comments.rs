use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::error::RepoError;
use quill_core::ports::CommentRepository;

/// Comments in insertion order.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|c| c.id == comment.id) {
            return Err(RepoError::Constraint("comments_pkey".to_string()));
        }
        store.push(comment.clone());
        Ok(comment)
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let store = self.store.read().await;
        let mut thread: Vec<Comment> = store
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(thread)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|c| c.post_id != post_id);
        Ok((before - store.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::NewComment;

    fn comment(post_id: Uuid, name: &str) -> Comment {
        Comment::new(
            NewComment {
                post_id,
                author_name: name.to_string(),
                content: "hello".to_string(),
                ..Default::default()
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_thread_newest_first_and_cascade() {
        let repo = InMemoryCommentRepository::new();
        let post_id = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.insert(comment(post_id, "first")).await.unwrap();
        repo.insert(comment(post_id, "second")).await.unwrap();
        repo.insert(comment(other, "elsewhere")).await.unwrap();

        let thread = repo.list_by_post(post_id).await.unwrap();
        let names: Vec<_> = thread.iter().map(|c| c.author_name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);

        assert_eq!(repo.delete_by_post(post_id).await.unwrap(), 2);
        assert!(repo.list_by_post(post_id).await.unwrap().is_empty());
        assert_eq!(repo.list_by_post(other).await.unwrap().len(), 1);
    }
}
