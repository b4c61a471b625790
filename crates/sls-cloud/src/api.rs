//! Capability traits for the remote platform.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::operation::Operation;
use crate::request::{CreateFunctionRequest, CreateVersionRequest, Function};

/// Function lookup and creation within a folder.
#[async_trait]
pub trait FunctionRegistry: Send + Sync {
    /// Functions in `folder_id` whose name is exactly `name`.
    async fn list_functions(&self, folder_id: &str, name: &str) -> ApiResult<Vec<Function>>;

    async fn create_function(&self, request: &CreateFunctionRequest) -> ApiResult<Operation>;
}

/// Publishing of function versions.
#[async_trait]
pub trait VersionApi: Send + Sync {
    async fn create_version(&self, request: &CreateVersionRequest) -> ApiResult<Operation>;
}

/// Blocks until an operation reaches `done`.
#[async_trait]
pub trait OperationWaiter: Send + Sync {
    async fn wait(&self, operation: Operation) -> ApiResult<Operation>;
}

/// Object upload to a bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, content: &[u8]) -> ApiResult<()>;
}
