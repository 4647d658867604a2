//! Domain entities - the core business objects.

mod comment;
mod image;
mod post;
mod session;
mod user;

pub use comment::{Comment, NewComment};
pub use image::{IMAGES_BUCKET, ImageKind, ImageUpload, ObjectPath, content_type_for};
pub use post::{NewPost, Post, PostPatch, resolve_slug, slugify};
pub use session::{AuthorRef, Session};
pub use user::{User, username_from_email};
