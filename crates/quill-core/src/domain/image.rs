//! Image uploads and their object-storage paths.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Bucket holding every uploaded image.
pub const IMAGES_BUCKET: &str = "images";

/// Where an uploaded image will be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Post cover, uploaded from the editor header.
    Cover,
    /// Image embedded in a post body.
    Inline,
    /// Attachment on a reader comment; no session required.
    Comment,
}

impl ImageKind {
    pub fn requires_session(self) -> bool {
        !matches!(self, ImageKind::Comment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Cover => "cover",
            ImageKind::Inline => "inline",
            ImageKind::Comment => "comment",
        }
    }
}

impl FromStr for ImageKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover" => Ok(ImageKind::Cover),
            "inline" => Ok(ImageKind::Inline),
            "comment" => Ok(ImageKind::Comment),
            other => Err(DomainError::Validation(format!("Unknown image kind: {other}"))),
        }
    }
}

/// A file picked by the user, ready to be stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.bytes.is_empty() {
            return Err(DomainError::Validation("Image file is empty".to_string()));
        }
        // SVG can carry script and is served from the API origin.
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !essence.starts_with("image/") || essence == "image/svg+xml" {
            return Err(DomainError::Validation(format!(
                "Unsupported content type: {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// A relative path inside the images bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Build a fresh, disambiguated path for an upload.
    ///
    /// Covers go under `{owner}/`, inline images under `{owner}/content-`, and
    /// comment attachments under `public/`.
    pub fn for_upload(
        kind: ImageKind,
        owner: Option<Uuid>,
        file_name: &str,
    ) -> Result<Self, DomainError> {
        let stamp = Utc::now().timestamp_millis();
        let nonce: u16 = rand::thread_rng().gen_range(0..1000);
        let ext = extension(file_name);
        let name = format!("{stamp}-{nonce}.{ext}");

        let path = match (kind, owner) {
            (ImageKind::Comment, _) => format!("public/{name}"),
            (ImageKind::Cover, Some(owner)) => format!("{owner}/{name}"),
            (ImageKind::Inline, Some(owner)) => format!("{owner}/content-{name}"),
            (_, None) => return Err(DomainError::Unauthorized),
        };
        Ok(Self(path))
    }

    /// Parse a path received from outside, refusing traversal and absolute paths.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = raw.is_empty()
            || raw.starts_with('/')
            || raw.contains('\\')
            || raw.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
        if invalid {
            return Err(DomainError::Validation(format!("Invalid object path: {raw}")));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn extension(file_name: &str) -> String {
    let ext: String = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("bin")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if ext.is_empty() { "bin".to_string() } else { ext }
}

/// Guess a content type from a path's extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_uploads_are_refused() {
        let upload = |content_type: &str| ImageUpload {
            kind: ImageKind::Comment,
            file_name: "pic".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![1, 2, 3],
        };

        assert!(upload("image/png").validate().is_ok());
        assert!(upload("image/svg+xml").validate().is_err());
        assert!(upload("Image/SVG+XML; charset=utf-8").validate().is_err());
        assert!(upload("text/html").validate().is_err());
    }

    #[test]
    fn test_upload_paths_are_namespaced() {
        let owner = Uuid::new_v4();

        let cover = ObjectPath::for_upload(ImageKind::Cover, Some(owner), "Photo.PNG").unwrap();
        assert!(cover.as_str().starts_with(&format!("{owner}/")));
        assert!(cover.as_str().ends_with(".png"));

        let inline = ObjectPath::for_upload(ImageKind::Inline, Some(owner), "a.jpg").unwrap();
        assert!(inline.as_str().starts_with(&format!("{owner}/content-")));

        let comment = ObjectPath::for_upload(ImageKind::Comment, None, "noext").unwrap();
        assert!(comment.as_str().starts_with("public/"));
        assert!(comment.as_str().ends_with(".bin"));
    }

    #[test]
    fn test_owner_required_for_author_images() {
        let result = ObjectPath::for_upload(ImageKind::Cover, None, "a.png");
        assert!(matches!(result, Err(DomainError::Unauthorized)));
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert!(ObjectPath::parse("public/1-2.png").is_ok());
        assert!(ObjectPath::parse("../etc/passwd").is_err());
        assert!(ObjectPath::parse("/abs.png").is_err());
        assert!(ObjectPath::parse("a//b.png").is_err());
    }

    #[test]
    fn test_upload_requires_image_content_type() {
        let upload = ImageUpload {
            kind: ImageKind::Comment,
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(upload.validate().is_err());
    }
}
