pub mod deploy;
pub mod pack;

use std::path::PathBuf;

use clap::Args;
use sls_core::{DeploymentSpec, parse_list};

/// Inputs shared by every command that builds an archive.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// TOML file with deployment settings; flags and env override it
    #[arg(short, long, env = "SLS_CONFIG")]
    pub config: Option<PathBuf>,
    /// Directory that include paths are relative to
    #[arg(long, env = "SLS_SOURCE_ROOT")]
    pub source_root: Option<String>,
    /// Files or directories to package, comma or newline separated
    #[arg(long, env = "SLS_INCLUDE")]
    pub include: Option<String>,
    /// Glob patterns to leave out, comma or newline separated
    #[arg(long, env = "SLS_EXCLUDE")]
    pub exclude: Option<String>,
}

impl SourceArgs {
    /// The config file, if any, with these flags layered on top.
    pub fn layered(&self, flags: DeploymentSpec) -> anyhow::Result<DeploymentSpec> {
        let base = match &self.config {
            Some(path) => DeploymentSpec::from_file(path)?,
            None => DeploymentSpec::default(),
        };
        let flags = DeploymentSpec {
            source_root: self.source_root.clone(),
            include: self.include.as_deref().map(parse_list),
            exclude: self.exclude.as_deref().map(parse_list),
            ..flags
        };
        Ok(base.overlay(flags))
    }
}
