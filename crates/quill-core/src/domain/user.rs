use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account held by the auth backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Public handle used in reader URLs, derived from the email.
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username_from_email(&email),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The local part of an email address, lowercased; `author` when there is none.
pub fn username_from_email(email: &str) -> String {
    match email.split('@').next().map(str::trim) {
        Some(local) if !local.is_empty() => local.to_lowercase(),
        _ => "author".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("Jane.Doe@example.com"), "jane.doe");
        assert_eq!(username_from_email("@example.com"), "author");
    }
}
