use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{BaseRepository, PostRepository};

/// Posts in insertion order. `(user_id, slug)` is unique.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken(posts: &[Post], candidate: &Post) -> bool {
    posts.iter().any(|p| {
        p.id != candidate.id && p.user_id == candidate.user_id && p.slug == candidate.slug
    })
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }
        if slug_taken(&store, &post) {
            return Err(RepoError::Constraint("posts_user_id_slug_key".to_string()));
        }
        store.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if slug_taken(&store, &post) {
            return Err(RepoError::Constraint("posts_user_id_slug_key".to_string()));
        }
        let slot = store
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|p| p.id != id);
        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        // Reverse first so that equal timestamps still list the later insert first.
        let mut mine: Vec<Post> = store
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::from_all(mine, page))
    }

    async fn find_by_slug(&self, user_id: Uuid, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .iter()
            .find(|p| p.user_id == user_id && p.slug == slug)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::NewPost;

    fn post(user_id: Uuid, slug: &str) -> Post {
        Post::new(
            user_id,
            NewPost {
                title: slug.to_string(),
                content: "<p>body</p>".to_string(),
                ..Default::default()
            },
            slug.to_string(),
        )
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();
        for i in 0..7 {
            repo.insert(post(author, &format!("post-{i}"))).await.unwrap();
        }
        repo.insert(post(Uuid::new_v4(), "other")).await.unwrap();

        let first = repo
            .list_by_user(author, PageRequest::new(1, 5).unwrap())
            .await
            .unwrap();
        assert_eq!(first.total_count, 7);
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.items[0].slug, "post-6");

        let second = repo
            .list_by_user(author, PageRequest::new(2, 5).unwrap())
            .await
            .unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].slug, "post-0");
    }

    #[tokio::test]
    async fn test_slug_unique_per_author_only() {
        let repo = InMemoryPostRepository::new();
        let alice = Uuid::new_v4();
        repo.insert(post(alice, "hello")).await.unwrap();

        assert!(matches!(
            repo.insert(post(alice, "hello")).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(repo.insert(post(Uuid::new_v4(), "hello")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryPostRepository::new();
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }
}
