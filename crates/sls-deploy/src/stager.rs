//! Staging archives in object storage.

use sls_cloud::ObjectStore;
use sls_core::StagingReference;
use tracing::info;

use crate::error::{DeployError, DeployResult};

/// Upload `content` to `<function_id>/<revision>.zip` in `bucket`.
pub async fn stage(
    store: &dyn ObjectStore,
    bucket: &str,
    function_id: &str,
    revision: Option<&str>,
    content: &[u8],
) -> DeployResult<StagingReference> {
    let revision = revision
        .filter(|r| !r.trim().is_empty())
        .ok_or(DeployError::MissingRevision)?;
    let reference = StagingReference::new(bucket, function_id, revision);

    info!(
        bucket,
        key = %reference.key,
        size_bytes = content.len(),
        "Staging archive"
    );
    store
        .put_object(&reference.bucket, &reference.key, content)
        .await
        .map_err(|source| DeployError::Upload {
            bucket: reference.bucket.clone(),
            key: reference.key.clone(),
            source,
        })?;

    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sls_cloud::{ApiError, ApiResult, InMemoryCloud};

    struct BrokenStore;

    #[async_trait]
    impl ObjectStore for BrokenStore {
        async fn put_object(&self, _bucket: &str, _key: &str, _content: &[u8]) -> ApiResult<()> {
            Err(ApiError::Storage("access denied".to_string()))
        }
    }

    #[tokio::test]
    async fn uploads_under_function_and_revision() {
        let cloud = InMemoryCloud::new();
        let reference = stage(&cloud, "my-bucket", "fn-1", Some("abc123"), b"zip")
            .await
            .unwrap();

        assert_eq!(reference.key, "fn-1/abc123.zip");
        assert_eq!(cloud.object("my-bucket", "fn-1/abc123.zip"), Some(b"zip".to_vec()));
    }

    #[tokio::test]
    async fn rerun_overwrites_same_key() {
        let cloud = InMemoryCloud::new();
        stage(&cloud, "b", "fn-1", Some("abc"), b"one").await.unwrap();
        stage(&cloud, "b", "fn-1", Some("abc"), b"two").await.unwrap();

        assert_eq!(cloud.object_keys().len(), 1);
        assert_eq!(cloud.object("b", "fn-1/abc.zip"), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn missing_revision_is_rejected() {
        let cloud = InMemoryCloud::new();
        for revision in [None, Some(""), Some("  ")] {
            let err = stage(&cloud, "b", "fn-1", revision, b"zip").await.unwrap_err();
            assert!(matches!(err, DeployError::MissingRevision));
        }
        assert!(cloud.object_keys().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_names_the_object() {
        let err = stage(&BrokenStore, "b", "fn-1", Some("abc"), b"zip")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "upload to b/fn-1/abc.zip failed: object storage error: access denied"
        );
    }
}
