//! Deployment orchestration for serverless functions.
//!
//! ```text
//! build archive ─► resolve function ─► [stage in bucket] ─► publish version
//! ```
//!
//! Each remote step waits for its operation to finish before the next one
//! starts. Nothing is retried or rolled back.

pub mod error;
pub mod orchestrator;
mod outcome;
pub mod publisher;
pub mod reporter;
pub mod resolver;
pub mod stager;

pub use error::{DeployError, DeployResult};
pub use orchestrator::{Deployer, MAX_INLINE_ARCHIVE_BYTES, archive_for};
pub use publisher::{publish_version, version_request};
pub use reporter::{Reporter, TracingReporter};
pub use resolver::resolve_function;
pub use stager::stage;
