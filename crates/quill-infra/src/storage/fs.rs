//! Local filesystem object storage.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use quill_core::domain::{IMAGES_BUCKET, ObjectPath, content_type_for};
use quill_core::ports::{ObjectStorage, StorageError, StoredObject};

/// Stores objects under `{root}/images/`. The content type is derived from
/// the file extension on download.
#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn full_path(&self, path: &ObjectPath) -> PathBuf {
        self.root.join(IMAGES_BUCKET).join(path.as_str())
    }
}

fn io_error(path: &ObjectPath, err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
        _ => StorageError::Io(format!("{path}: {err}")),
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn upload(
        &self,
        path: &ObjectPath,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(path, e))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| io_error(path, e))?;
        file.write_all(&bytes).await.map_err(|e| io_error(path, e))?;
        file.flush().await.map_err(|e| io_error(path, e))?;

        tracing::debug!(path = %path, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn download(&self, path: &ObjectPath) -> Result<StoredObject, StorageError> {
        let bytes = fs::read(self.full_path(path))
            .await
            .map_err(|e| io_error(path, e))?;
        Ok(StoredObject {
            content_type: content_type_for(path.as_str()).to_string(),
            bytes,
        })
    }

    fn public_url(&self, path: &ObjectPath) -> String {
        super::public_url(&self.base_url, path)
    }
}
