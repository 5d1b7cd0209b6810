use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, Result};

pub mod local;
pub mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

/// Key-addressed byte store behind file attachments. The backend is picked
/// once at startup from Settings.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the bytes and returns the key they were stored under.
    async fn put(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Reads the bytes stored under a key. Returns None for unknown keys.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Resolves a key to a time-limited download URL.
    async fn presign_download(&self, key: &str, expire_secs: u32) -> Result<String>;
}

pub fn from_settings(config: &StorageConfig) -> Result<Arc<dyn FileStorage>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(&config.local_root))),
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                AppError::Internal("Storage backend is s3 but no s3 configuration given".to_string())
            })?;
            Ok(Arc::new(S3Storage::new(s3_config)?))
        }
    }
}

/// Replaces anything outside [a-zA-Z0-9._-] so the name is safe as a path
/// component and an object key.
pub(crate) fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Storage keys are namespaced `responses/{unique_name}` where the unique
/// name carries a short random prefix to avoid collisions.
pub(crate) fn unique_key(file_name: &str) -> String {
    let safe_name = sanitize_file_name(file_name);
    let prefix = uuid::Uuid::new_v4().simple().to_string();
    format!("responses/{}_{}", &prefix[..8], safe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("q1 plan (final).pdf"), "q1_plan__final_.pdf");
        assert_eq!(sanitize_file_name("报告.docx"), "__.docx");
    }

    #[test]
    fn unique_keys_are_namespaced_and_distinct() {
        let a = unique_key("notes.txt");
        let b = unique_key("notes.txt");
        assert!(a.starts_with("responses/"));
        assert!(a.ends_with("_notes.txt"));
        assert_ne!(a, b);
    }
}
