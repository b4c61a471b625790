pub mod config;
pub mod error;
pub mod parse;
pub mod types;

pub use config::{ArchiveInputs, DeploymentConfig, DeploymentSpec, RunContext};
pub use error::{ConfigError, ConfigResult};
pub use parse::{parse_environment, parse_lines, parse_list, parse_memory};
pub use types::*;
