//! S3 client implementation.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::locator::ObjectStore;

/// S3 storage client scoped to one bucket.
///
/// Credentials come from the ambient provider chain (environment,
/// profile, or execution role), never from module-level state; callers
/// construct a client per bucket and pass it down explicitly.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a client for a bucket from a shared SDK config.
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload bytes to the bucket.
    pub async fn put_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {}", key);
        Ok(())
    }

    /// Serialize a value as JSON and upload it.
    pub async fn put_json<T: serde::Serialize>(&self, value: &T, key: &str) -> StorageResult<()> {
        let body = serde_json::to_vec_pretty(value)?;
        self.put_bytes(body, key, "application/json").await
    }

    /// Check if an object exists via a head request.
    pub async fn head_exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let text = e.to_string();
                if text.contains("NotFound") || text.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(text))
                }
            }
        }
    }
}

impl ObjectStore for S3Client {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.head_exists(key).await
    }
}
