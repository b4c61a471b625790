//! Find-or-create of the target function.

use sls_cloud::{CreateFunctionRequest, FunctionRegistry, OperationWaiter};
use sls_core::FunctionHandle;
use tracing::{info, warn};

use crate::error::DeployResult;
use crate::outcome::finished_field;

/// Look up `name` in `folder_id`, creating the function if it does not exist.
///
/// When several functions share the name the first listed one is used.
pub async fn resolve_function(
    registry: &dyn FunctionRegistry,
    waiter: &dyn OperationWaiter,
    folder_id: &str,
    name: &str,
    description: &str,
) -> DeployResult<FunctionHandle> {
    let functions = registry.list_functions(folder_id, name).await?;

    if let Some(existing) = functions.first() {
        if functions.len() > 1 {
            warn!(
                count = functions.len(),
                function_id = %existing.id,
                "Several functions share this name, using the first"
            );
        }
        info!(function_id = %existing.id, name, "Found existing function");
        return Ok(FunctionHandle {
            id: existing.id.clone(),
            name: name.to_string(),
            folder_id: folder_id.to_string(),
            created: false,
        });
    }

    info!(name, folder_id, "Function not found, creating it");
    let request = CreateFunctionRequest {
        folder_id: folder_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    };
    let operation = registry.create_function(&request).await?;
    let operation = waiter.wait(operation).await?;
    let id = finished_field(&operation, "functionId")?;

    info!(function_id = %id, name, "Created function");
    Ok(FunctionHandle {
        id,
        name: name.to_string(),
        folder_id: folder_id.to_string(),
        created: true,
    })
}
