//! Object storage for the `images` bucket.

mod fs;
mod memory;

pub use fs::FsObjectStorage;
pub use memory::InMemoryObjectStorage;

use quill_core::domain::{IMAGES_BUCKET, ObjectPath};

/// `{base}/storage/images/{path}`, the route the server serves objects from.
pub(crate) fn public_url(base_url: &str, path: &ObjectPath) -> String {
    format!(
        "{}/storage/{IMAGES_BUCKET}/{path}",
        base_url.trim_end_matches('/')
    )
}
