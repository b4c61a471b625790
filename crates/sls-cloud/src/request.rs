//! Wire types for the function API.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize, Serializer};
use sls_core::StagingReference;

/// A function as returned by the list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Function {
    pub id: String,
    pub folder_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ListFunctionsResponse {
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunctionRequest {
    pub folder_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub function_id: String,
    pub runtime: String,
    pub entrypoint: String,
    pub resources: Resources,
    /// Protobuf duration, e.g. `5s`.
    pub execution_timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(rename = "tag", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub source: ArtifactSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resources {
    /// Bytes; int64 fields travel as decimal strings.
    #[serde(serialize_with = "as_decimal_string")]
    pub memory: u64,
}

/// Where the new version's code comes from. Exactly one is sent.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactSource {
    /// Archive bytes sent inline, base64 on the wire.
    Content(#[serde(serialize_with = "as_base64")] Vec<u8>),
    /// Archive previously staged in object storage.
    Package(Package),
}

impl ArtifactSource {
    pub fn is_inline(&self) -> bool {
        matches!(self, ArtifactSource::Content(_))
    }
}

impl fmt::Debug for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSource::Content(bytes) => write!(f, "Content({} bytes)", bytes.len()),
            ArtifactSource::Package(package) => f.debug_tuple("Package").field(package).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub bucket_name: String,
    pub object_name: String,
}

impl From<StagingReference> for Package {
    fn from(reference: StagingReference) -> Self {
        Package {
            bucket_name: reference.bucket,
            object_name: reference.key,
        }
    }
}

fn as_decimal_string<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}
