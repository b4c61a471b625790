//! Publishing a new function version.

use chrono::Utc;
use sls_cloud::{ArtifactSource, CreateVersionRequest, OperationWaiter, Resources, VersionApi};
use sls_core::{DeploymentConfig, VersionResult};
use tracing::info;

use crate::error::DeployResult;
use crate::outcome::finished_field;

/// Build the version-creation request for `function_id`.
pub fn version_request(
    function_id: &str,
    config: &DeploymentConfig,
    source: ArtifactSource,
) -> DeployResult<CreateVersionRequest> {
    Ok(CreateVersionRequest {
        function_id: function_id.to_string(),
        runtime: config.runtime.clone(),
        entrypoint: config.entrypoint.clone(),
        resources: Resources {
            memory: config.memory_bytes,
        },
        execution_timeout: format!("{}s", config.execution_timeout_secs),
        service_account_id: config.service_account_id.clone(),
        description: config.description.clone(),
        environment: config.environment_map()?,
        tags: config.tags.clone(),
        source,
    })
}

/// Submit a version, wait for it, and return the new version id.
pub async fn publish_version(
    api: &dyn VersionApi,
    waiter: &dyn OperationWaiter,
    function_id: &str,
    config: &DeploymentConfig,
    source: ArtifactSource,
) -> DeployResult<VersionResult> {
    let request = version_request(function_id, config, source)?;
    info!(
        function_id,
        runtime = %request.runtime,
        inline = request.source.is_inline(),
        "Creating function version"
    );

    let operation = api.create_version(&request).await?;
    let operation = waiter.wait(operation).await?;
    let version_id = finished_field(&operation, "functionVersionId")?;

    info!(function_id, version_id = %version_id, "Published version");
    Ok(VersionResult {
        function_id: function_id.to_string(),
        version_id,
        time: Utc::now(),
    })
}
