//! [`ArtifactStore`] backed by an S3 bucket.

use std::path::Path;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::CloudError;
use crate::store::ArtifactStore;

/// Uploads build outputs into a single bucket.
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<(), CloudError> {
        // Streams the file from disk instead of buffering it.
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| CloudError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| CloudError::Upload {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(bucket = %self.bucket, key, content_type, "Stored artifact");
        Ok(())
    }
}
