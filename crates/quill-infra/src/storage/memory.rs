use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::ObjectPath;
use quill_core::ports::{ObjectStorage, StorageError, StoredObject};

/// Object storage held in process memory. Lost on restart.
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        path: &ObjectPath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(path.as_str()) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    async fn download(&self, path: &ObjectPath) -> Result<StoredObject, StorageError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn public_url(&self, path: &ObjectPath) -> String {
        super::public_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_never_overwrites() {
        let storage = InMemoryObjectStorage::new("http://localhost:8080/");
        let path = ObjectPath::parse("public/1-2.png").unwrap();

        storage.upload(&path, vec![1], "image/png").await.unwrap();
        let err = storage.upload(&path, vec![2], "image/png").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        let stored = storage.download(&path).await.unwrap();
        assert_eq!(stored.bytes, vec![1]);
        assert_eq!(
            storage.public_url(&path),
            "http://localhost:8080/storage/images/public/1-2.png"
        );
    }
}
