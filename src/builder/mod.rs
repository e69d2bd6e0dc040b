//! Build-script generation.
//!
//! One manifest in, one build script out. Generation is a stateless,
//! single-pass function of (manifest, host capabilities, compiler override,
//! module root, distribution path): it reads the manifest, resolves the
//! toolchain, filters the unit lists, synthesizes the script text, and
//! performs exactly one filesystem write. Identical inputs yield
//! byte-identical output.

pub mod filter;
pub mod makefile;
pub mod probe;
pub mod toolchain;
pub mod vcproj;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::probe::HostProbe;
use crate::core::manifest::{CompilerPref, Manifest};
use crate::core::platform::{Configuration, Platform};
use crate::util::fs::write_string;

/// Where installed outputs expect to find the suite at runtime, unless the
/// caller supplies a distribution path.
pub const DEFAULT_DISTRO_PATH: &str = "@executable_path/../Slipway";

/// Inputs for one generation call.
#[derive(Debug)]
pub struct GenerateRequest<'a> {
    /// Module directory containing the manifest.
    pub project_dir: &'a Path,
    /// Project name; the manifest is `<project_dir>/<name>.toml`.
    pub project_name: &'a str,
    /// Platform to generate for (normally the host).
    pub platform: Platform,
    /// Configuration this invocation will build.
    pub configuration: Configuration,
    /// Compiler override; always wins over the manifest preference.
    pub forced_compiler: Option<CompilerPref>,
    /// Module's relative path back to the suite root.
    pub module_root: &'a str,
    /// Distribution path override.
    pub distro_path: Option<&'a str>,
}

/// What a generation call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// No manifest; the module keeps whatever build script it already has.
    Skipped,
    Makefile(PathBuf),
    VcProject(PathBuf),
}

impl Generated {
    /// Path of the written script, if one was written.
    pub fn script_path(&self) -> Option<&Path> {
        match self {
            Generated::Skipped => None,
            Generated::Makefile(path) | Generated::VcProject(path) => Some(path),
        }
    }

    pub fn did_generate(&self) -> bool {
        !matches!(self, Generated::Skipped)
    }
}

/// Generate the build script for one module.
///
/// Returns [`Generated::Skipped`] when the module has no manifest. A
/// malformed manifest is an error scoped to this module; the caller decides
/// whether the batch continues.
pub fn generate(request: &GenerateRequest<'_>, probe: &dyn HostProbe) -> Result<Generated> {
    let manifest = match Manifest::load(request.project_dir, request.project_name)? {
        Some(manifest) => manifest,
        None => {
            tracing::debug!(
                "no manifest for {} in {}",
                request.project_name,
                request.project_dir.display()
            );
            return Ok(Generated::Skipped);
        }
    };

    if let Some(forced) = request.forced_compiler {
        tracing::info!("forced compiler is: {}", forced.as_str());
    }

    if request.platform == Platform::Windows {
        let text = vcproj::synthesize(&manifest, request.module_root);
        let path = request
            .project_dir
            .join(format!("{}.vcproj", request.project_name));
        write_string(&path, &text)
            .with_context(|| format!("failed to write project for {}", request.project_name))?;
        return Ok(Generated::VcProject(path));
    }

    let toolchain = toolchain::resolve(
        request.platform,
        manifest.compiler,
        request.forced_compiler,
        probe,
    );
    let text = makefile::synthesize(
        &manifest,
        request.platform,
        request.configuration,
        &toolchain,
        probe.is_arm(),
        request.module_root,
        request.distro_path.unwrap_or(DEFAULT_DISTRO_PATH),
    );
    let path = request.project_dir.join("Makefile");
    write_string(&path, &text)
        .with_context(|| format!("failed to write Makefile for {}", request.project_name))?;
    Ok(Generated::Makefile(path))
}
