//! Endpoints and credentials for the remote clients.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_FUNCTIONS_URL: &str = "https://serverless-functions.api.cloud.yandex.net";
pub const DEFAULT_OPERATIONS_URL: &str = "https://operation.api.cloud.yandex.net";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.yandexcloud.net";
pub const DEFAULT_STORAGE_REGION: &str = "ru-central1";

/// Settings for [`crate::CloudClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub functions_url: String,
    pub operations_url: String,
    /// Bearer token sent with every request.
    pub iam_token: String,
    /// Delay between polls of a pending operation.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("functions_url", &self.functions_url)
            .field("operations_url", &self.operations_url)
            .field("iam_token", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(iam_token: impl Into<String>) -> Self {
        ClientConfig {
            functions_url: DEFAULT_FUNCTIONS_URL.to_string(),
            operations_url: DEFAULT_OPERATIONS_URL.to_string(),
            iam_token: iam_token.into(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Settings for [`crate::S3ObjectStore`].
#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    /// Static keys; when absent the AWS environment/profile chain is used.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Address buckets as `<endpoint>/<bucket>` instead of `<bucket>.<endpoint>`.
    pub path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            region: DEFAULT_STORAGE_REGION.to_string(),
            access_key: None,
            secret_key: None,
            path_style: false,
        }
    }
}
