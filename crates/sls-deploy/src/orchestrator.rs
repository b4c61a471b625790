//! The deployment sequence: archive, resolve, stage, publish.
//!
//! Steps run strictly one after another. A failure ends the run; anything
//! already created remotely (for example a new function without a version)
//! is left in place and the error is reported.

use std::sync::Arc;

use sls_cloud::{ArtifactSource, FunctionRegistry, ObjectStore, OperationWaiter, VersionApi};
use sls_core::{DeploymentConfig, RunContext, VersionResult};
use sls_pack::{Archive, build_archive};
use tracing::info;

use crate::error::{DeployError, DeployResult};
use crate::publisher::publish_version;
use crate::reporter::{Group, Reporter};
use crate::resolver::resolve_function;
use crate::stager::stage;

/// Largest archive sent inline with a version request (3.5 MiB).
pub const MAX_INLINE_ARCHIVE_BYTES: usize = 3_670_016;

/// Runs deployments against a set of remote capabilities.
pub struct Deployer {
    functions: Arc<dyn FunctionRegistry>,
    versions: Arc<dyn VersionApi>,
    operations: Arc<dyn OperationWaiter>,
    storage: Option<Arc<dyn ObjectStore>>,
    reporter: Arc<dyn Reporter>,
}

impl Deployer {
    pub fn new(
        functions: Arc<dyn FunctionRegistry>,
        versions: Arc<dyn VersionApi>,
        operations: Arc<dyn OperationWaiter>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            functions,
            versions,
            operations,
            storage: None,
            reporter,
        }
    }

    /// Use one backend for the function, version, and operation APIs.
    pub fn for_platform<P>(platform: Arc<P>, reporter: Arc<dyn Reporter>) -> Self
    where
        P: FunctionRegistry + VersionApi + OperationWaiter + 'static,
    {
        Self::new(platform.clone(), platform.clone(), platform, reporter)
    }

    /// Object store used when the config names a bucket.
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Deploy and report: outputs on success, the error message on failure.
    pub async fn run(&self, config: &DeploymentConfig, context: &RunContext) -> DeployResult<VersionResult> {
        match self.deploy(config, context).await {
            Ok(result) => {
                for (name, value) in result.outputs() {
                    self.reporter.set_output(name, &value);
                }
                Ok(result)
            }
            Err(err) => {
                self.reporter.set_failed(&err.to_string());
                Err(err)
            }
        }
    }

    /// Build the archive from the config and deploy it.
    pub async fn deploy(&self, config: &DeploymentConfig, context: &RunContext) -> DeployResult<VersionResult> {
        let archive = {
            let _group = Group::start(self.reporter.as_ref(), "Building archive");
            archive_for(config).await?
        };
        self.deploy_archive(config, context, archive).await
    }

    /// Deploy an already built archive.
    pub async fn deploy_archive(
        &self,
        config: &DeploymentConfig,
        context: &RunContext,
        archive: Archive,
    ) -> DeployResult<VersionResult> {
        if config.bucket.is_none() && archive.len() > MAX_INLINE_ARCHIVE_BYTES {
            return Err(DeployError::ArchiveTooLarge {
                size: archive.len(),
                limit: MAX_INLINE_ARCHIVE_BYTES,
            });
        }

        let function = {
            let _group = Group::start(self.reporter.as_ref(), "Resolving function");
            resolve_function(
                self.functions.as_ref(),
                self.operations.as_ref(),
                &config.folder_id,
                &config.function_name,
                &context.function_description(),
            )
            .await?
        };

        let source = match &config.bucket {
            Some(bucket) => {
                let _group = Group::start(self.reporter.as_ref(), "Uploading archive to bucket");
                let storage = self
                    .storage
                    .as_ref()
                    .ok_or_else(|| DeployError::NoObjectStore(bucket.clone()))?;
                let reference = stage(
                    storage.as_ref(),
                    bucket,
                    &function.id,
                    context.revision.as_deref(),
                    archive.bytes(),
                )
                .await?;
                ArtifactSource::Package(reference.into())
            }
            None => ArtifactSource::Content(archive.into_bytes()),
        };

        let _group = Group::start(self.reporter.as_ref(), "Creating function version");
        let result = publish_version(
            self.versions.as_ref(),
            self.operations.as_ref(),
            &function.id,
            config,
            source,
        )
        .await?;

        info!(
            function_id = %result.function_id,
            version_id = %result.version_id,
            "Deployment finished"
        );
        Ok(result)
    }
}

/// Build the archive on the blocking pool.
pub async fn archive_for(config: &DeploymentConfig) -> DeployResult<Archive> {
    let root = config.source_root.clone();
    let include = config.include.clone();
    let exclude = config.exclude.clone();
    let archive = tokio::task::spawn_blocking(move || build_archive(&root, &include, &exclude)).await??;
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sls_cloud::InMemoryCloud;
    use sls_core::DeploymentSpec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Reporter for RecordingReporter {
        fn start_group(&self, name: &str) {
            self.push(format!("group:{name}"));
        }
        fn end_group(&self) {
            self.push("endgroup".to_string());
        }
        fn set_output(&self, name: &str, value: &str) {
            self.push(format!("output:{name}={value}"));
        }
        fn set_failed(&self, message: &str) {
            self.push(format!("failed:{message}"));
        }
        fn add_mask(&self, _secret: &str) {}
    }

    fn config(root: &std::path::Path, bucket: Option<&str>) -> DeploymentConfig {
        DeploymentSpec {
            folder_id: Some("b1g".to_string()),
            function_name: Some("api".to_string()),
            runtime: Some("nodejs18".to_string()),
            entrypoint: Some("index.handler".to_string()),
            bucket: bucket.map(String::from),
            source_root: Some(root.display().to_string()),
            ..Default::default()
        }
        .into_config()
        .unwrap()
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.js"), "exports.handler = () => 1;\n").unwrap();
        dir
    }

    #[tokio::test]
    async fn run_reports_groups_and_outputs() {
        let dir = project();
        let cloud = Arc::new(InMemoryCloud::new());
        let reporter = Arc::new(RecordingReporter::default());
        let deployer = Deployer::for_platform(cloud.clone(), reporter.clone());

        let result = deployer
            .run(&config(dir.path(), None), &RunContext::default())
            .await
            .unwrap();

        let events = reporter.events();
        assert_eq!(events[0], "group:Building archive");
        assert!(events.contains(&"group:Resolving function".to_string()));
        assert!(events.contains(&"group:Creating function version".to_string()));
        assert!(events.contains(&format!("output:function-id={}", result.function_id)));
        assert!(events.contains(&format!("output:version-id={}", result.version_id)));
        assert!(events.iter().any(|e| e.starts_with("output:time=")));
        assert_eq!(
            events.iter().filter(|e| e.starts_with("group:")).count(),
            events.iter().filter(|e| *e == "endgroup").count()
        );
    }

    #[tokio::test]
    async fn run_reports_failure_message() {
        let cloud = Arc::new(InMemoryCloud::new());
        let reporter = Arc::new(RecordingReporter::default());
        let deployer = Deployer::for_platform(cloud.clone(), reporter.clone());

        let missing = std::path::Path::new("/definitely/not/here");
        let err = deployer
            .run(&config(missing, None), &RunContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::Archive(_)));
        let failed: Vec<_> = reporter
            .events()
            .into_iter()
            .filter(|e| e.starts_with("failed:"))
            .collect();
        assert_eq!(failed, vec![format!("failed:{err}")]);
        assert_eq!(cloud.list_calls(), 0);
    }

    #[tokio::test]
    async fn bucket_without_store_is_rejected() {
        let dir = project();
        let cloud = Arc::new(InMemoryCloud::new());
        let deployer = Deployer::for_platform(cloud.clone(), Arc::new(RecordingReporter::default()));

        let context = RunContext {
            revision: Some("abc".to_string()),
            repository: None,
        };
        let err = deployer
            .deploy(&config(dir.path(), Some("my-bucket")), &context)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::NoObjectStore(ref b) if b == "my-bucket"));
    }
}
