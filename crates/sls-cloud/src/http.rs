//! REST client for the function and operation APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{FunctionRegistry, OperationWaiter, VersionApi};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::operation::Operation;
use crate::request::{CreateFunctionRequest, CreateVersionRequest, Function, ListFunctionsResponse};

/// HTTP client for the serverless function API.
#[derive(Clone)]
pub struct CloudClient {
    client: Client,
    functions_url: String,
    operations_url: String,
    iam_token: String,
    poll_interval: Duration,
}

impl CloudClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            client,
            functions_url: config.functions_url.trim_end_matches('/').to_owned(),
            operations_url: config.operations_url.trim_end_matches('/').to_owned(),
            iam_token: config.iam_token.clone(),
            poll_interval: config.poll_interval,
        })
    }

    /// Fetch the current state of an operation.
    pub async fn get_operation(&self, id: &str) -> ApiResult<Operation> {
        let url = format!("{}/operations/{id}", self.operations_url);
        self.send(self.client.get(&url)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.bearer_auth(&self.iam_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl FunctionRegistry for CloudClient {
    async fn list_functions(&self, folder_id: &str, name: &str) -> ApiResult<Vec<Function>> {
        let filter = format!("name=\"{name}\"");
        let url = Url::parse_with_params(
            &format!("{}/functions/v1/functions", self.functions_url),
            &[("folderId", folder_id), ("filter", filter.as_str())],
        )
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let response: ListFunctionsResponse = self.send(self.client.get(url)).await?;
        Ok(response
            .functions
            .into_iter()
            .filter(|f| f.name == name)
            .collect())
    }

    async fn create_function(&self, request: &CreateFunctionRequest) -> ApiResult<Operation> {
        let url = format!("{}/functions/v1/functions", self.functions_url);
        self.send(self.client.post(&url).json(request)).await
    }
}

#[async_trait]
impl VersionApi for CloudClient {
    async fn create_version(&self, request: &CreateVersionRequest) -> ApiResult<Operation> {
        let url = format!("{}/functions/v1/versions", self.functions_url);
        self.send(self.client.post(&url).json(request)).await
    }
}

#[async_trait]
impl OperationWaiter for CloudClient {
    async fn wait(&self, mut operation: Operation) -> ApiResult<Operation> {
        while !operation.done {
            debug!(operation = %operation.id, "Waiting for operation");
            tokio::time::sleep(self.poll_interval).await;
            operation = self.get_operation(&operation.id).await?;
        }
        Ok(operation)
    }
}
