//! GitHub Actions workflow commands.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use sls_deploy::Reporter;
use tracing::warn;

const OUTPUT_DELIMITER: &str = "ghadelimiter_sls_deploy";

/// Reports through workflow commands on stdout and the `GITHUB_OUTPUT` file.
#[derive(Debug, Default, Clone)]
pub struct GithubReporter {
    output_file: Option<PathBuf>,
}

impl GithubReporter {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        GithubReporter { output_file }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from))
    }

    fn append_output(&self, entry: &str) -> bool {
        let Some(path) = &self.output_file else {
            return false;
        };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));
        match written {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), "Cannot write step output: {e}");
                false
            }
        }
    }
}

impl Reporter for GithubReporter {
    fn start_group(&self, name: &str) {
        println!("{}", command("group", name));
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }

    fn set_output(&self, name: &str, value: &str) {
        let entry = output_entry(name, value);
        if !self.append_output(&entry) {
            print!("{entry}");
        }
    }

    fn set_failed(&self, message: &str) {
        println!("{}", command("error", message));
    }

    fn add_mask(&self, secret: &str) {
        if !secret.is_empty() {
            println!("{}", command("add-mask", secret));
        }
    }
}

/// `::name::value` with the value escaped.
pub fn command(name: &str, value: &str) -> String {
    format!("::{name}::{}", escape_data(value))
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// One entry in the step output file.
pub fn output_entry(name: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{name}<<{OUTPUT_DELIMITER}\n{value}\n{OUTPUT_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    }
}
