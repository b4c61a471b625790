//! Deployment inputs: raw spec, validated config, and run context.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::parse::{parse_environment, parse_memory};

pub const DEFAULT_MEMORY: &str = "128Mb";
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_INCLUDE: &str = ".";

/// Raw deployment inputs, as read from `sls-deploy.toml` or the command line.
///
/// Every field is optional so that a file and CLI arguments can be layered
/// with [`DeploymentSpec::overlay`] before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DeploymentSpec {
    pub folder_id: Option<String>,
    pub function_name: Option<String>,
    pub runtime: Option<String>,
    pub entrypoint: Option<String>,
    pub memory: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub execution_timeout: Option<u64>,
    pub environment: Option<Vec<String>>,
    pub service_account: Option<String>,
    pub bucket: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub source_root: Option<String>,
}

impl DeploymentSpec {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Layer `over` on top of `self`; fields set in `over` win.
    pub fn overlay(self, over: DeploymentSpec) -> DeploymentSpec {
        DeploymentSpec {
            folder_id: over.folder_id.or(self.folder_id),
            function_name: over.function_name.or(self.function_name),
            runtime: over.runtime.or(self.runtime),
            entrypoint: over.entrypoint.or(self.entrypoint),
            memory: over.memory.or(self.memory),
            include: over.include.or(self.include),
            exclude: over.exclude.or(self.exclude),
            execution_timeout: over.execution_timeout.or(self.execution_timeout),
            environment: over.environment.or(self.environment),
            service_account: over.service_account.or(self.service_account),
            bucket: over.bucket.or(self.bucket),
            description: over.description.or(self.description),
            tags: over.tags.or(self.tags),
            source_root: over.source_root.or(self.source_root),
        }
    }

    /// Validate the inputs and apply defaults.
    pub fn into_config(self) -> ConfigResult<DeploymentConfig> {
        let ArchiveInputs {
            source_root,
            include,
            exclude,
        } = self.archive_inputs();

        let folder_id = required(self.folder_id, "folder-id")?;
        let function_name = required(self.function_name, "function-name")?;
        let runtime = required(self.runtime, "runtime")?;
        let entrypoint = required(self.entrypoint, "entrypoint")?;

        let memory_bytes = parse_memory(self.memory.as_deref().unwrap_or(DEFAULT_MEMORY))?;

        let execution_timeout_secs = self
            .execution_timeout
            .unwrap_or(DEFAULT_EXECUTION_TIMEOUT_SECS);
        if execution_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let environment = self.environment.unwrap_or_default();
        parse_environment(&environment)?;

        Ok(DeploymentConfig {
            folder_id,
            function_name,
            runtime,
            entrypoint,
            memory_bytes,
            include,
            exclude,
            execution_timeout_secs,
            environment,
            service_account_id: optional(self.service_account),
            bucket: optional(self.bucket),
            description: self.description.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            source_root,
        })
    }

    /// The subset of inputs needed to build the archive, with defaults.
    pub fn archive_inputs(&self) -> ArchiveInputs {
        ArchiveInputs {
            source_root: PathBuf::from(
                optional(self.source_root.clone()).unwrap_or_else(|| ".".to_string()),
            ),
            include: self
                .include
                .clone()
                .filter(|paths| !paths.is_empty())
                .unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()]),
            exclude: self.exclude.clone().unwrap_or_default(),
        }
    }
}

/// Archive roots and filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveInputs {
    pub source_root: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn required(value: Option<String>, name: &'static str) -> ConfigResult<String> {
    optional(value).ok_or(ConfigError::Missing(name))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validated, immutable inputs for a single deployment run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    pub folder_id: String,
    pub function_name: String,
    pub runtime: String,
    pub entrypoint: String,
    pub memory_bytes: u64,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub execution_timeout_secs: u64,
    /// Raw `KEY=VALUE` lines; already checked to parse.
    pub environment: Vec<String>,
    pub service_account_id: Option<String>,
    /// When set, the archive is staged in this bucket instead of sent inline.
    pub bucket: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    /// Directory that include paths and archive entry names are relative to.
    pub source_root: PathBuf,
}

impl DeploymentConfig {
    pub fn environment_map(&self) -> ConfigResult<BTreeMap<String, String>> {
        parse_environment(&self.environment)
    }
}

/// Facts about the CI run that triggered the deployment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    /// Source revision, used to key staged objects.
    pub revision: Option<String>,
    /// `owner/repo` of the originating repository.
    pub repository: Option<String>,
}

impl RunContext {
    /// Read `GITHUB_SHA` and `GITHUB_REPOSITORY` from the environment.
    pub fn from_env() -> Self {
        RunContext {
            revision: optional(std::env::var("GITHUB_SHA").ok()),
            repository: optional(std::env::var("GITHUB_REPOSITORY").ok()),
        }
    }

    /// Description attached to functions created by this run.
    pub fn function_description(&self) -> String {
        match &self.repository {
            Some(repo) => format!("Created from {repo}"),
            None => "Created by sls-deploy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> DeploymentSpec {
        DeploymentSpec {
            folder_id: Some("b1g-folder".to_string()),
            function_name: Some("api".to_string()),
            runtime: Some("nodejs18".to_string()),
            entrypoint: Some("index.handler".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_applied() {
        let config = minimal().into_config().unwrap();
        assert_eq!(config.memory_bytes, 128 * 1024 * 1024);
        assert_eq!(config.execution_timeout_secs, 5);
        assert_eq!(config.include, vec!["."]);
        assert!(config.exclude.is_empty());
        assert!(config.bucket.is_none());
        assert!(config.service_account_id.is_none());
        assert_eq!(config.source_root, PathBuf::from("."));
    }

    #[test]
    fn archive_inputs_survive_validation() {
        let spec = DeploymentSpec {
            source_root: Some(" app ".to_string()),
            include: Some(vec!["./src".to_string()]),
            exclude: Some(vec!["**/*.map".to_string()]),
            ..minimal()
        };
        let inputs = spec.archive_inputs();
        let config = spec.into_config().unwrap();
        assert_eq!(config.source_root, PathBuf::from("app"));
        assert_eq!(config.include, vec!["./src"]);
        assert_eq!(config.exclude, vec!["**/*.map"]);
        assert_eq!(inputs.source_root, config.source_root);
    }

    #[test]
    fn blank_bucket_means_inline() {
        let spec = DeploymentSpec {
            bucket: Some("   ".to_string()),
            ..minimal()
        };
        assert!(spec.into_config().unwrap().bucket.is_none());
    }

    #[test]
    fn missing_function_name_is_rejected() {
        let spec = DeploymentSpec {
            function_name: Some(" ".to_string()),
            ..minimal()
        };
        assert!(matches!(
            spec.into_config(),
            Err(ConfigError::Missing("function-name"))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let spec = DeploymentSpec {
            execution_timeout: Some(0),
            ..minimal()
        };
        assert!(matches!(spec.into_config(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn bad_environment_fails_validation() {
        let spec = DeploymentSpec {
            environment: Some(vec!["=oops".to_string()]),
            ..minimal()
        };
        assert!(matches!(
            spec.into_config(),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn overlay_prefers_later_fields() {
        let file = DeploymentSpec {
            memory: Some("256Mb".to_string()),
            bucket: Some("from-file".to_string()),
            ..minimal()
        };
        let cli = DeploymentSpec {
            bucket: Some("from-cli".to_string()),
            ..Default::default()
        };
        let merged = file.overlay(cli).into_config().unwrap();
        assert_eq!(merged.bucket.as_deref(), Some("from-cli"));
        assert_eq!(merged.memory_bytes, 256 * 1024 * 1024);
        assert_eq!(merged.function_name, "api");
    }

    #[test]
    fn parse_deployment_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sls-deploy.toml");
        std::fs::write(
            &path,
            r#"
folder-id = "b1g-folder"
function-name = "api"
runtime = "nodejs18"
entrypoint = "index.handler"
memory = "256Mb"
include = ["./src", "package.json"]
exclude = ["**/*.test.js"]
environment = ["NODE_ENV=production"]
tags = ["latest"]
"#,
        )
        .unwrap();

        let config = DeploymentSpec::from_file(&path)
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.include, vec!["./src", "package.json"]);
        assert_eq!(config.exclude, vec!["**/*.test.js"]);
        assert_eq!(config.tags, vec!["latest"]);
        assert_eq!(
            config.environment_map().unwrap().get("NODE_ENV").map(String::as_str),
            Some("production")
        );
    }

    #[test]
    fn description_mentions_repository() {
        let ctx = RunContext {
            revision: None,
            repository: Some("acme/api".to_string()),
        };
        assert_eq!(ctx.function_description(), "Created from acme/api");
        assert_eq!(RunContext::default().function_description(), "Created by sls-deploy");
    }
}
