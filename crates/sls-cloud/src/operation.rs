//! Long-running remote operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handle for an asynchronous remote mutation.
///
/// `metadata` and `error` are only meaningful once `done` is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operation {
    pub id: String,
    pub description: String,
    pub done: bool,
    pub metadata: Option<Value>,
    pub error: Option<OperationError>,
    pub response: Option<Value>,
}

impl Operation {
    /// Read a string field from the operation metadata.
    pub fn metadata_str(&self, field: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(field)?.as_str()
    }
}

/// Error carried by a finished operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationError {
    pub code: i32,
    pub message: String,
    pub details: Vec<Value>,
}

impl OperationError {
    /// Canonical gRPC status name for `code`.
    pub fn code_name(&self) -> String {
        let name = match self.code {
            0 => "OK",
            1 => "CANCELLED",
            2 => "UNKNOWN",
            3 => "INVALID_ARGUMENT",
            4 => "DEADLINE_EXCEEDED",
            5 => "NOT_FOUND",
            6 => "ALREADY_EXISTS",
            7 => "PERMISSION_DENIED",
            8 => "RESOURCE_EXHAUSTED",
            9 => "FAILED_PRECONDITION",
            10 => "ABORTED",
            11 => "OUT_OF_RANGE",
            12 => "UNIMPLEMENTED",
            13 => "INTERNAL",
            14 => "UNAVAILABLE",
            15 => "DATA_LOSS",
            16 => "UNAUTHENTICATED",
            other => return format!("CODE_{other}"),
        };
        name.to_string()
    }

    /// Details rendered for display; strings verbatim, anything else as JSON.
    pub fn detail_strings(&self) -> Vec<String> {
        self.details
            .iter()
            .map(|detail| match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_name(), self.message)?;
        for detail in self.detail_strings() {
            write!(f, "\n{detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for OperationError {}
