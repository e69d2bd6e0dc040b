//! Implementation of `slipway build`.

use anyhow::{bail, Result};

use slipway::core::platform::Configuration;
use slipway::ops::{build_suite, SuiteOptions};
use slipway::util::Shell;

use crate::cli::BuildArgs;

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        bail!("suite root does not exist: {}", root.display());
    }

    let opts = SuiteOptions {
        root,
        configuration: Configuration::from_cli_name(&args.configuration),
        clean: args.clean,
        forced_compiler: args.compiler,
        distro_path: args.distro_path,
        log_root: args.log_root,
    };

    let report = build_suite(&opts, shell)?;
    if !report.is_success() {
        bail!(
            "{} of {} projects failed",
            report.failures.len(),
            report.attempted
        );
    }
    Ok(())
}
