//! In-memory platform for dry runs and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::api::{FunctionRegistry, ObjectStore, OperationWaiter, VersionApi};
use crate::error::{ApiError, ApiResult};
use crate::operation::{Operation, OperationError};
use crate::request::{CreateFunctionRequest, CreateVersionRequest, Function};

/// A fake platform implementing every capability trait.
///
/// Mutations return pending operations; their outcome is revealed by
/// [`OperationWaiter::wait`]. Calls are recorded for inspection.
#[derive(Default)]
pub struct InMemoryCloud {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    functions: Vec<Function>,
    operations: HashMap<String, Operation>,
    objects: BTreeMap<(String, String), Vec<u8>>,
    version_requests: Vec<CreateVersionRequest>,
    list_calls: usize,
    create_function_calls: usize,
    version_error: Option<OperationError>,
    omit_metadata: bool,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Register the finished form of an operation and hand back the pending one.
    fn pending(&mut self, description: &str, finished: Operation) -> Operation {
        let id = self.next_id("op");
        let pending = Operation {
            id: id.clone(),
            description: description.to_string(),
            done: false,
            ..Default::default()
        };
        self.operations.insert(
            id.clone(),
            Operation {
                id,
                description: description.to_string(),
                done: true,
                ..finished
            },
        );
        pending
    }
}

impl InMemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing function.
    pub fn with_function(self, id: &str, folder_id: &str, name: &str) -> Self {
        self.lock().functions.push(Function {
            id: id.to_string(),
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            description: String::new(),
        });
        self
    }

    /// Finish every version operation with `error`.
    pub fn fail_versions_with(self, error: OperationError) -> Self {
        self.lock().version_error = Some(error);
        self
    }

    /// Finish mutations without metadata.
    pub fn without_metadata(self) -> Self {
        self.lock().omit_metadata = true;
        self
    }

    pub fn functions(&self) -> Vec<Function> {
        self.lock().functions.clone()
    }

    pub fn version_requests(&self) -> Vec<CreateVersionRequest> {
        self.lock().version_requests.clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_keys(&self) -> Vec<(String, String)> {
        self.lock().objects.keys().cloned().collect()
    }

    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn create_function_calls(&self) -> usize {
        self.lock().create_function_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FunctionRegistry for InMemoryCloud {
    async fn list_functions(&self, folder_id: &str, name: &str) -> ApiResult<Vec<Function>> {
        let mut state = self.lock();
        state.list_calls += 1;
        Ok(state
            .functions
            .iter()
            .filter(|f| f.folder_id == folder_id && f.name == name)
            .cloned()
            .collect())
    }

    async fn create_function(&self, request: &CreateFunctionRequest) -> ApiResult<Operation> {
        let mut state = self.lock();
        state.create_function_calls += 1;

        let id = state.next_id("fn");
        state.functions.push(Function {
            id: id.clone(),
            folder_id: request.folder_id.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
        });

        let metadata = (!state.omit_metadata).then(|| json!({ "functionId": id }));
        Ok(state.pending(
            "Create function",
            Operation {
                metadata,
                ..Default::default()
            },
        ))
    }
}

#[async_trait]
impl VersionApi for InMemoryCloud {
    async fn create_version(&self, request: &CreateVersionRequest) -> ApiResult<Operation> {
        let mut state = self.lock();
        state.version_requests.push(request.clone());

        let finished = match state.version_error.clone() {
            Some(error) => Operation {
                error: Some(error),
                ..Default::default()
            },
            None => {
                let version_id = state.next_id("ver");
                Operation {
                    metadata: (!state.omit_metadata).then(|| {
                        json!({ "functionId": request.function_id, "functionVersionId": version_id })
                    }),
                    ..Default::default()
                }
            }
        };
        Ok(state.pending("Create function version", finished))
    }
}

#[async_trait]
impl OperationWaiter for InMemoryCloud {
    async fn wait(&self, operation: Operation) -> ApiResult<Operation> {
        if operation.done {
            return Ok(operation);
        }
        self.lock()
            .operations
            .get(&operation.id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("operation {} not found", operation.id),
            })
    }
}

#[async_trait]
impl ObjectStore for InMemoryCloud {
    async fn put_object(&self, bucket: &str, key: &str, content: &[u8]) -> ApiResult<()> {
        self.lock()
            .objects
            .insert((bucket.to_string(), key.to_string()), content.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_wait_reveals_function_id() {
        let cloud = InMemoryCloud::new();
        let op = cloud
            .create_function(&CreateFunctionRequest {
                folder_id: "b1g".to_string(),
                name: "api".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        assert!(!op.done);

        let done = cloud.wait(op).await.unwrap();
        let id = done.metadata_str("functionId").unwrap().to_string();
        assert_eq!(cloud.list_functions("b1g", "api").await.unwrap()[0].id, id);
        assert!(cloud.list_functions("other", "api").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let cloud = InMemoryCloud::new();
        let err = cloud
            .wait(Operation {
                id: "nope".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }
}
