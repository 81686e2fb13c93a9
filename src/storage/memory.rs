use std::collections::HashMap;

use tokio::sync::RwLock;

use super::Storage;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage already holding `blob` under `key`.
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::from([(key.to_owned(), blob.into())])),
        }
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: String) -> Result<()> {
        self.blobs.write().await.insert(key.to_owned(), blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("transactions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_blob() {
        let storage = MemoryStorage::with_blob("transactions", "[]");
        storage
            .set("transactions", "[1]".to_owned())
            .await
            .unwrap();

        assert_eq!(
            storage.get("transactions").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert_eq!(storage.get("other").await.unwrap(), None);
    }
}
