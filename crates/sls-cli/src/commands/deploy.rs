use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use sls_cloud::config::{
    DEFAULT_FUNCTIONS_URL, DEFAULT_OPERATIONS_URL, DEFAULT_STORAGE_ENDPOINT, DEFAULT_STORAGE_REGION,
};
use sls_cloud::{ArtifactSource, ClientConfig, CloudClient, InMemoryCloud, S3ObjectStore, StorageConfig};
use sls_core::{DeploymentConfig, DeploymentSpec, RunContext, parse_lines, parse_list};
use sls_deploy::{Deployer, Reporter};

use super::SourceArgs;

#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Folder that owns the function
    #[arg(long, env = "SLS_FOLDER_ID")]
    pub folder_id: Option<String>,
    /// Function name; created on first deploy
    #[arg(long, env = "SLS_FUNCTION_NAME")]
    pub function_name: Option<String>,
    /// Runtime id, e.g. nodejs18 or python311
    #[arg(long, env = "SLS_RUNTIME")]
    pub runtime: Option<String>,
    /// Handler entrypoint, e.g. index.handler
    #[arg(long, env = "SLS_ENTRYPOINT")]
    pub entrypoint: Option<String>,
    /// Memory size such as 128Mb or 1Gb
    #[arg(long, env = "SLS_MEMORY")]
    pub memory: Option<String>,
    /// Execution timeout in seconds
    #[arg(long, env = "SLS_EXECUTION_TIMEOUT")]
    pub execution_timeout: Option<u64>,
    /// KEY=VALUE pairs, one per line
    #[arg(long, env = "SLS_ENVIRONMENT")]
    pub environment: Option<String>,
    /// Service account the version runs as
    #[arg(long, env = "SLS_SERVICE_ACCOUNT")]
    pub service_account: Option<String>,
    /// Stage the archive in this bucket instead of sending it inline
    #[arg(long, env = "SLS_BUCKET")]
    pub bucket: Option<String>,
    /// Version description
    #[arg(long, env = "SLS_DESCRIPTION")]
    pub description: Option<String>,
    /// Version tags, comma or newline separated
    #[arg(long, env = "SLS_TAGS")]
    pub tags: Option<String>,

    /// Source revision; names the staged object
    #[arg(long, env = "GITHUB_SHA")]
    pub revision: Option<String>,
    /// owner/repo, used in the description of new functions
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// IAM token for the functions and operations APIs
    #[arg(long, env = "SLS_IAM_TOKEN", hide_env_values = true)]
    pub iam_token: Option<String>,
    #[arg(long, env = "SLS_FUNCTIONS_URL", default_value = DEFAULT_FUNCTIONS_URL)]
    pub functions_url: String,
    #[arg(long, env = "SLS_OPERATIONS_URL", default_value = DEFAULT_OPERATIONS_URL)]
    pub operations_url: String,
    /// Milliseconds between operation polls
    #[arg(long, env = "SLS_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    #[arg(long, env = "SLS_STORAGE_ENDPOINT", default_value = DEFAULT_STORAGE_ENDPOINT)]
    pub storage_endpoint: String,
    #[arg(long, env = "SLS_STORAGE_REGION", default_value = DEFAULT_STORAGE_REGION)]
    pub storage_region: String,
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub storage_access_key: Option<String>,
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub storage_secret_key: Option<String>,
    /// Address buckets by path; needed for IP or local endpoints
    #[arg(long, env = "SLS_STORAGE_PATH_STYLE")]
    pub storage_path_style: bool,

    /// Run every step against an in-memory platform; nothing is sent
    #[arg(long)]
    pub dry_run: bool,
}

impl DeployArgs {
    /// Flags as a spec fragment, without the config file.
    fn flags(&self) -> DeploymentSpec {
        DeploymentSpec {
            folder_id: self.folder_id.clone(),
            function_name: self.function_name.clone(),
            runtime: self.runtime.clone(),
            entrypoint: self.entrypoint.clone(),
            memory: self.memory.clone(),
            execution_timeout: self.execution_timeout,
            environment: self.environment.as_deref().map(parse_lines),
            service_account: self.service_account.clone(),
            bucket: self.bucket.clone(),
            description: self.description.clone(),
            tags: self.tags.as_deref().map(parse_list),
            ..Default::default()
        }
    }

    pub fn deployment_config(&self) -> anyhow::Result<DeploymentConfig> {
        let spec = self.source.layered(self.flags())?;
        Ok(spec.into_config()?)
    }

    pub fn run_context(&self) -> RunContext {
        RunContext {
            revision: non_blank(self.revision.clone()),
            repository: non_blank(self.repository.clone()),
        }
    }

    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let token = non_blank(self.iam_token.clone())
            .context("an IAM token is required (--iam-token or SLS_IAM_TOKEN)")?;
        Ok(ClientConfig {
            functions_url: self.functions_url.clone(),
            operations_url: self.operations_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            ..ClientConfig::new(token)
        })
    }

    fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            endpoint: self.storage_endpoint.clone(),
            region: self.storage_region.clone(),
            access_key: non_blank(self.storage_access_key.clone()),
            secret_key: non_blank(self.storage_secret_key.clone()),
            path_style: self.storage_path_style,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn deploy(args: DeployArgs, reporter: Arc<dyn Reporter>) -> ExitCode {
    for secret in [&args.iam_token, &args.storage_secret_key].into_iter().flatten() {
        reporter.add_mask(secret);
    }

    let config = match args.deployment_config() {
        Ok(config) => config,
        Err(e) => return fail(reporter.as_ref(), e),
    };
    let context = args.run_context();

    if args.dry_run {
        return dry_run(&config, &context, reporter).await;
    }

    let deployer = match platform_deployer(&args, &config, reporter.clone()) {
        Ok(deployer) => deployer,
        Err(e) => return fail(reporter.as_ref(), e),
    };
    // Deployer::run reports its own failure.
    match deployer.run(&config, &context).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn fail(reporter: &dyn Reporter, err: anyhow::Error) -> ExitCode {
    reporter.set_failed(&format!("{err:#}"));
    ExitCode::FAILURE
}

fn platform_deployer(
    args: &DeployArgs,
    config: &DeploymentConfig,
    reporter: Arc<dyn Reporter>,
) -> anyhow::Result<Deployer> {
    let client = CloudClient::new(&args.client_config()?)?;
    let mut deployer = Deployer::for_platform(Arc::new(client), reporter);
    if config.bucket.is_some() {
        let store = S3ObjectStore::new(&args.storage_config())?;
        deployer = deployer.with_storage(Arc::new(store));
    }
    Ok(deployer)
}

async fn dry_run(config: &DeploymentConfig, context: &RunContext, reporter: Arc<dyn Reporter>) -> ExitCode {
    let cloud = Arc::new(InMemoryCloud::new());
    let deployer = Deployer::for_platform(cloud.clone(), reporter.clone()).with_storage(cloud.clone());
    let Ok(result) = deployer.run(config, context).await else {
        return ExitCode::FAILURE;
    };

    for request in cloud.version_requests() {
        match &request.source {
            ArtifactSource::Content(bytes) => {
                println!("✓ Dry run: {} bytes would be sent inline", bytes.len());
            }
            ArtifactSource::Package(package) => {
                println!(
                    "✓ Dry run: archive would be staged at {}/{}",
                    package.bucket_name, package.object_name
                );
            }
        }
        println!("  Function: {}", config.function_name);
        println!("  Runtime:  {} ({})", request.runtime, request.entrypoint);
    }
    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(reporter.as_ref(), e.into()),
    }
}
