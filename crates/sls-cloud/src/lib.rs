//! Remote collaborators for sls-deploy.
//!
//! Each capability the deployment needs is a small trait in [`api`], so the
//! orchestration can run against the REST client and S3 store, or against
//! [`InMemoryCloud`] in tests and dry runs.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod operation;
pub mod request;
pub mod storage;

pub use api::{FunctionRegistry, ObjectStore, OperationWaiter, VersionApi};
pub use config::{ClientConfig, StorageConfig};
pub use error::{ApiError, ApiResult};
pub use http::CloudClient;
pub use memory::InMemoryCloud;
pub use operation::{Operation, OperationError};
pub use request::{
    ArtifactSource, CreateFunctionRequest, CreateVersionRequest, Function, Package, Resources,
};
pub use storage::S3ObjectStore;
