//! Implementation of `slipway generate`.

use anyhow::{bail, Context, Result};

use slipway::builder::probe::RealProbe;
use slipway::builder::{generate, GenerateRequest, Generated};
use slipway::core::platform::{Configuration, Platform};
use slipway::util::shell::Status;
use slipway::util::Shell;

use crate::cli::GenerateArgs;

pub fn execute(args: GenerateArgs, shell: &Shell) -> Result<()> {
    if !args.project_dir.is_dir() {
        bail!("project directory does not exist: {}", args.project_dir.display());
    }

    let name = match args.name {
        Some(name) => name,
        None => args
            .project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .context("cannot derive a project name from the directory; pass --name")?,
    };

    let request = GenerateRequest {
        project_dir: &args.project_dir,
        project_name: &name,
        platform: Platform::host(),
        configuration: Configuration::from_cli_name(&args.configuration),
        forced_compiler: args.compiler,
        module_root: &args.module_root,
        distro_path: args.distro_path.as_deref(),
    };

    match generate(&request, &RealProbe)? {
        Generated::Skipped => {
            shell.status(Status::Skipped, format!("{} (no manifest)", name));
        }
        Generated::Makefile(path) | Generated::VcProject(path) => {
            shell.status(Status::Generated, path.display());
        }
    }
    Ok(())
}
