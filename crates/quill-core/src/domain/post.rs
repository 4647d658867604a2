use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a published blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// HTML body produced by the editor.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Unique within the owner's namespace.
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted by the editor when publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Left empty to derive the slug from the title.
    #[serde(default)]
    pub slug: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
///
/// An empty `image_url` removes the cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.image_url.is_none()
            && self.slug.is_none()
    }
}

impl Post {
    /// Create a new post owned by `user_id` with a resolved slug.
    pub fn new(user_id: Uuid, draft: NewPost, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title.trim().to_string(),
            content: draft.content,
            image_url: draft.image_url.filter(|url| !url.trim().is_empty()),
            slug,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit and bump `updated_at`.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(url) = patch.image_url {
            self.image_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(slug) = patch.slug {
            self.slug = slugify(&slug);
        }
        self.updated_at = Utc::now();
    }
}

/// Normalize free text into a URL slug.
///
/// Lowercases, turns spaces into `-` and drops everything outside
/// `[A-Za-z0-9_-]`.
pub fn slugify(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// The slug to store for a draft: the submitted one if non-empty, else one
/// derived from the title.
pub fn resolve_slug(draft: &NewPost) -> String {
    match draft.slug.as_deref().map(slugify) {
        Some(slug) if !slug.is_empty() => slug,
        _ => slugify(&draft.title),
    }
}
