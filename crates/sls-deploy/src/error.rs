//! Deployment error types.

use sls_cloud::{ApiError, OperationError};
use sls_core::ConfigError;
use sls_pack::ArchiveError;
use thiserror::Error;

/// Result type alias for deployment steps.
pub type DeployResult<T> = Result<T, DeployError>;

/// Every failure is terminal for the run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("invalid input: {0}")]
    Input(#[from] ConfigError),

    #[error("no source revision available to key the staged archive")]
    MissingRevision,

    #[error("bucket {0} is configured but no object store is available")]
    NoObjectStore(String),

    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("archive task failed: {0}")]
    ArchiveTask(#[from] tokio::task::JoinError),

    #[error("archive is {size} bytes, over the {limit} byte inline upload limit; configure a bucket")]
    ArchiveTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    RemoteApi(#[from] ApiError),

    #[error("upload to {bucket}/{key} failed: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    RemoteOperation(OperationError),

    #[error("operation {operation} finished without {field} in its metadata")]
    MissingMetadata {
        operation: String,
        field: &'static str,
    },
}
