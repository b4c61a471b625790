//! Shared types passed between the deployment stages.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A remote function resolved by name within a folder.
///
/// Whether it was found or freshly created does not matter downstream;
/// `created` is kept for reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    pub id: String,
    pub name: String,
    pub folder_id: String,
    pub created: bool,
}

/// Location of an archive staged in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingReference {
    pub bucket: String,
    pub key: String,
}

impl StagingReference {
    /// Key objects by function and revision so reruns overwrite.
    pub fn object_key(function_id: &str, revision: &str) -> String {
        format!("{function_id}/{revision}.zip")
    }

    pub fn new(bucket: &str, function_id: &str, revision: &str) -> Self {
        StagingReference {
            bucket: bucket.to_string(),
            key: Self::object_key(function_id, revision),
        }
    }
}

/// Outputs of a successful deployment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    pub function_id: String,
    pub version_id: String,
    pub time: DateTime<Utc>,
}

impl VersionResult {
    /// Name/value pairs reported as run outputs.
    pub fn outputs(&self) -> [(&'static str, String); 3] {
        [
            ("function-id", self.function_id.clone()),
            ("version-id", self.version_id.clone()),
            ("time", self.time.to_rfc3339()),
        ]
    }
}
