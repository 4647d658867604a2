use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, UserRepository};

/// Users keyed by id. Email and username are unique, as in the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(existing: &User, candidate: &User) -> Option<&'static str> {
    if existing.id == candidate.id {
        return None;
    }
    if existing.email == candidate.email {
        Some("users_email_key")
    } else if existing.username == candidate.username {
        Some("users_username_key")
    } else {
        None
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) {
            return Err(RepoError::Constraint("users_pkey".to_string()));
        }
        if let Some(key) = store.values().find_map(|u| clashes(u, &user)) {
            return Err(RepoError::Constraint(key.to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if let Some(key) = store.values().find_map(|u| clashes(u, &user)) {
            return Err(RepoError::Constraint(key.to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new("sam@one.com".into(), "h".into()))
            .await
            .unwrap();

        let err = repo
            .insert(User::new("sam@two.com".into(), "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(key) if key == "users_username_key"));
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_username() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .insert(User::new("kim@example.com".into(), "h".into()))
            .await
            .unwrap();

        let by_email = repo.find_by_email("kim@example.com").await.unwrap();
        let by_name = repo.find_by_username("kim").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert_eq!(by_name.map(|u| u.id), Some(user.id));
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }
}
