use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use sls_deploy::{Reporter, TracingReporter};
use tracing_subscriber::EnvFilter;

mod commands;
mod github;

use commands::deploy::DeployArgs;
use commands::pack::PackArgs;
use github::GithubReporter;

#[derive(Parser)]
#[command(
    name = "sls-deploy",
    about = "Package sources and publish serverless function versions",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "SLS_LOG_FORMAT")]
    log_format: LogFormat,
    /// How run progress and outputs are reported
    #[arg(long, global = true, value_enum, default_value_t = ReporterKind::Auto, env = "SLS_REPORTER")]
    reporter: ReporterKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the archive, resolve the function, and publish a new version.
    ///
    /// Settings come from --config, then flags, then SLS_* variables.
    /// With --bucket the archive is uploaded to <function-id>/<revision>.zip
    /// and referenced from the version; otherwise it is sent inline.
    Deploy(DeployArgs),
    /// Build the deployment archive and write it to a file.
    Pack(PackArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReporterKind {
    /// github when GITHUB_ACTIONS=true, plain otherwise
    Auto,
    Github,
    Plain,
}

impl ReporterKind {
    fn build(self) -> Arc<dyn Reporter> {
        let github = match self {
            ReporterKind::Auto => std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
            ReporterKind::Github => true,
            ReporterKind::Plain => false,
        };
        if github {
            Arc::new(GithubReporter::from_env())
        } else {
            Arc::new(TracingReporter)
        }
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("sls=info".parse()?);
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
    Ok(())
}

/// Commands report their own failures; main only sets the exit status.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.log_format) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::Deploy(args) => commands::deploy::deploy(args, cli.reporter.build()).await,
        Commands::Pack(args) => commands::pack::pack(&args),
    }
}
