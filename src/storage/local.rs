use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{unique_key, FileStorage};

/// Filesystem-backed store. Files live flat under the root directory;
/// their keys keep the `responses/` namespace.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a `responses/{unique_name}` key to its path under the root.
    fn path_for_key(&self, key: &str) -> Option<PathBuf> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("responses"), Some(name), None) if !name.is_empty() => {
                Some(self.root.join(name))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn put(&self, file_name: &str, data: &[u8], _content_type: &str) -> Result<String> {
        let key = unique_key(file_name);
        let path = self
            .path_for_key(&key)
            .ok_or_else(|| AppError::Storage(format!("Invalid storage key: {}", key)))?;

        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create storage directory: {}", e))
        })?;

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create file: {}", e)))?;

        file.write_all(data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {}", e)))?;

        Ok(key)
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.path_for_key(key) else {
            tracing::warn!("Invalid storage key: {}", key);
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {}", e))),
        }
    }

    async fn presign_download(&self, key: &str, _expire_secs: u32) -> Result<String> {
        // Local files are served through the API; the URL never expires.
        Ok(format!("/api/file/local/{}", urlencoding::encode(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_then_read_round_trips() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let key = storage
            .put("notes.txt", b"hello", "text/plain")
            .await
            .unwrap();
        assert!(key.starts_with("responses/"));

        let bytes = storage.read(&key).await.unwrap();
        assert_eq!(bytes, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn read_unknown_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert_eq!(storage.read("responses/nope.txt").await.unwrap(), None);
        assert_eq!(storage.read("../etc/passwd").await.unwrap(), None);
    }

    #[tokio::test]
    async fn presigned_url_points_at_local_endpoint() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let url = storage
            .presign_download("responses/abc_notes.txt", 3600)
            .await
            .unwrap();
        assert_eq!(url, "/api/file/local/responses%2Fabc_notes.txt");
    }
}
