use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment left by a reader under a post. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    /// Set when the commenter was logged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields submitted by the comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_name: String,
    #[serde(default)]
    pub author_email: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Comment {
    pub fn new(draft: NewComment, user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id: draft.post_id,
            user_id,
            author_name: draft.author_name.trim().to_string(),
            author_email: draft
                .author_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            content: draft.content.trim().to_string(),
            image_url: draft.image_url.filter(|u| !u.trim().is_empty()),
            created_at: Utc::now(),
        }
    }

    /// First letter of the author's name, used as an avatar.
    pub fn initial(&self) -> char {
        self.author_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}
