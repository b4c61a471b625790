//! Run reporting: log groups, outputs, failure, and secret masking.

use tracing::{error, info};

/// Sink for everything the run reports to its caller.
///
/// Passed explicitly to the [`crate::Deployer`] rather than held globally.
pub trait Reporter: Send + Sync {
    fn start_group(&self, name: &str);

    fn end_group(&self);

    fn set_output(&self, name: &str, value: &str);

    fn set_failed(&self, message: &str);

    /// Register a value that must never appear in output.
    fn add_mask(&self, secret: &str);
}

/// Reports through `tracing`; masking is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn start_group(&self, name: &str) {
        info!(group = name, "Starting");
    }

    fn end_group(&self) {}

    fn set_output(&self, name: &str, value: &str) {
        info!(output = name, value, "Output");
    }

    fn set_failed(&self, message: &str) {
        error!("{message}");
    }

    fn add_mask(&self, _secret: &str) {}
}

/// Ends the group when dropped, so early returns close it too.
pub(crate) struct Group<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Group<'a> {
    pub(crate) fn start(reporter: &'a dyn Reporter, name: &str) -> Self {
        reporter.start_group(name);
        Group { reporter }
    }
}

impl Drop for Group<'_> {
    fn drop(&mut self) {
        self.reporter.end_group();
    }
}
