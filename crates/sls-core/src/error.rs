//! Error types for deployment input parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for input parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while turning raw inputs into a `DeploymentConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse deployment file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required input: {0}")]
    Missing(&'static str),

    #[error("invalid memory value: {0:?}")]
    InvalidMemory(String),

    #[error("execution timeout must be a positive number of seconds")]
    InvalidTimeout,

    #[error("invalid environment line: {0:?}")]
    InvalidEnvironment(String),
}
