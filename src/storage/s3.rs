use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::config::S3Config;
use crate::error::{AppError, Result};
use crate::storage::{unique_key, FileStorage};

/// S3/MinIO-backed store using path-style bucket access.
pub struct S3Storage {
    bucket: Box<Bucket>,
}

impl S3Storage {
    pub fn new(config: &S3Config) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Storage(format!("Failed to create S3 bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) for MinIO compatibility.
        bucket.set_path_style();

        Ok(Self { bucket })
    }
}

#[async_trait]
impl FileStorage for S3Storage {
    async fn put(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String> {
        let key = unique_key(file_name);

        self.bucket
            .put_object_with_content_type(&key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        tracing::debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(key)
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.bucket.get_object(key).await {
            Ok(response) => Ok(Some(response.to_vec())),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(None)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to download '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }

    async fn presign_download(&self, key: &str, expire_secs: u32) -> Result<String> {
        self.bucket
            .presign_get(key, expire_secs, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!("Failed to presign URL for '{}': {}", key, e))
            })
    }
}
