use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use sls_core::{ArchiveInputs, DeploymentSpec};
use sls_pack::Archive;

use super::SourceArgs;

#[derive(Args, Debug)]
pub struct PackArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Where to write the archive
    #[arg(short, long, default_value = "function.zip")]
    pub output: PathBuf,
    /// Print every archive entry
    #[arg(long)]
    pub list: bool,
}

pub fn pack(args: &PackArgs) -> ExitCode {
    match write_archive(args) {
        Ok(archive) => {
            println!(
                "✓ Packed {} files ({:.1} KB)",
                archive.entries().len(),
                archive.len() as f64 / 1024.0
            );
            println!("  Output: {}", args.output.display());
            println!("  SHA256: {}", archive.sha256());
            if args.list {
                for entry in archive.entries() {
                    println!("    {entry}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Pack failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn write_archive(args: &PackArgs) -> anyhow::Result<Archive> {
    let ArchiveInputs {
        source_root,
        include,
        exclude,
    } = args.source.layered(DeploymentSpec::default())?.archive_inputs();

    let archive = sls_pack::build_archive(&source_root, &include, &exclude)?;
    std::fs::write(&args.output, archive.bytes())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_archive_to_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/index.js"), "exports.handler = () => 1;\n").unwrap();
        std::fs::write(dir.path().join("src/index.test.js"), "test();\n").unwrap();
        let output = dir.path().join("out.zip");

        let args = PackArgs {
            source: SourceArgs {
                source_root: Some(dir.path().display().to_string()),
                include: Some("src".to_string()),
                exclude: Some("**/*.test.js".to_string()),
                ..Default::default()
            },
            output: output.clone(),
            list: false,
        };
        assert_eq!(pack(&args), ExitCode::SUCCESS);

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn missing_include_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = PackArgs {
            source: SourceArgs {
                source_root: Some(dir.path().display().to_string()),
                include: Some("nope".to_string()),
                ..Default::default()
            },
            output: dir.path().join("out.zip"),
            list: false,
        };
        assert_eq!(pack(&args), ExitCode::FAILURE);
        assert!(!dir.path().join("out.zip").exists());
    }
}
