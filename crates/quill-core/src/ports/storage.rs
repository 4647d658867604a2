//! Object storage port - the `images` bucket.

use async_trait::async_trait;

use crate::domain::ObjectPath;

/// A stored object as served back to readers.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Object storage trait - abstraction over storage backends (filesystem, in-memory).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object. Fails with [`StorageError::AlreadyExists`] rather than overwrite.
    async fn upload(
        &self,
        path: &ObjectPath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn download(&self, path: &ObjectPath) -> Result<StoredObject, StorageError>;

    /// Public URL for a stored path. Pure; does not check existence.
    fn public_url(&self, path: &ObjectPath) -> String;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
