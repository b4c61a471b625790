//! S3-compatible object storage.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use crate::api::ObjectStore;
use crate::config::StorageConfig;
use crate::error::{ApiError, ApiResult};

const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Uploads archives through the S3 API.
pub struct S3ObjectStore {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> ApiResult<Self> {
        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| ApiError::Storage(format!("invalid storage credentials: {e}")))?;

        Ok(Self {
            region: Region::Custom {
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
            },
            credentials,
            path_style: config.path_style,
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, content: &[u8]) -> ApiResult<()> {
        let mut bucket = Bucket::new(bucket, self.region.clone(), self.credentials.clone())
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        if self.path_style {
            bucket = bucket.with_path_style();
        }

        debug!(bucket = %bucket.name(), key, size_bytes = content.len(), "Uploading object");
        let response = bucket
            .put_object_with_content_type(key, content, ARCHIVE_CONTENT_TYPE)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(ApiError::Storage(format!(
                "upload of {key} returned status {status}"
            )));
        }
        Ok(())
    }
}
