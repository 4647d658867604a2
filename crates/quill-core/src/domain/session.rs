use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::username_from_email;

/// An authenticated session.
///
/// Treated as a read-only capability: it attributes posts and comments to a
/// user and gates the authoring operations. The backend decides what it may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn username(&self) -> String {
        username_from_email(&self.email)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// How a reader URL names a post's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    Id(Uuid),
    Username(String),
}

impl AuthorRef {
    /// Parse a URL segment: a UUID names the author directly, anything else is a username.
    pub fn parse(segment: &str) -> Self {
        match Uuid::parse_str(segment) {
            Ok(id) => AuthorRef::Id(id),
            Err(_) => AuthorRef::Username(segment.to_lowercase()),
        }
    }
}

impl std::fmt::Display for AuthorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorRef::Id(id) => write!(f, "{id}"),
            AuthorRef::Username(name) => f.write_str(name),
        }
    }
}
