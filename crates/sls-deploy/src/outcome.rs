//! Reading the result of a finished operation.

use sls_cloud::Operation;

use crate::error::{DeployError, DeployResult};

/// Extract `field` from a finished operation's metadata.
///
/// The error field is checked first so a failed operation is never reported
/// as missing metadata.
pub(crate) fn finished_field(operation: &Operation, field: &'static str) -> DeployResult<String> {
    if let Some(error) = &operation.error {
        return Err(DeployError::RemoteOperation(error.clone()));
    }
    operation
        .metadata_str(field)
        .map(String::from)
        .ok_or_else(|| DeployError::MissingMetadata {
            operation: operation.id.clone(),
            field,
        })
}
