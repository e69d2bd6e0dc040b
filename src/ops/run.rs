//! Running generated build scripts and classifying their output.
//!
//! Success is decided by scanning the combined stdout+stderr of the native
//! build tool. For Make builds, success is the **absence** of any known
//! failure marker, not the presence of a success marker. The marker set is
//! a fixed contract shared with every toolchain the scripts drive. The
//! Visual C++ runner keeps its tool's success-marker set instead.

use std::path::Path;

use anyhow::Result;

use crate::core::platform::Configuration;
use crate::util::process::ProcessBuilder;

/// A Make build failed iff its output contains any of these.
///
/// `error:` (with the colon) keeps clang's summary lines from flagging
/// builds that had no real errors.
pub const MAKE_FAILURE_MARKERS: [&str; 4] = [
    "error:",
    "Error: ",
    "make: *** No rule to make target",
    "No such file or directory",
];

/// A Visual C++ build succeeded iff its output contains any of these.
pub const VS_SUCCESS_MARKERS: [&str; 3] = ["0 error", "up-to-date", "0 erreur"];

/// Classify Make output: success is the absence of every failure marker.
pub fn make_output_succeeded(output: &str) -> bool {
    !MAKE_FAILURE_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
}

/// Classify Visual C++ output.
pub fn vs_output_succeeded(output: &str) -> bool {
    VS_SUCCESS_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
}

/// Result of running one module's build script.
#[derive(Debug)]
pub struct BuildOutcome {
    pub succeeded: bool,
    /// Combined stdout+stderr, for the build/error logs.
    pub output: String,
}

/// Run `make` in a module directory and classify the result.
pub fn run_make(
    project_dir: &Path,
    config: Configuration,
    clean: bool,
) -> Result<BuildOutcome> {
    if clean {
        // Clean output is irrelevant to classification; a failed clean
        // surfaces in the build that follows.
        let _ = ProcessBuilder::new("make")
            .args(["-j", "4", "clean"])
            .cwd(project_dir)
            .exec_combined()?;
    }

    let output = ProcessBuilder::new("make")
        .args(["-j", "4", config.as_str()])
        .cwd(project_dir)
        .exec_combined()?;

    Ok(BuildOutcome {
        succeeded: make_output_succeeded(&output),
        output,
    })
}

/// Run `vcbuild` on a project file and classify the result.
pub fn run_vcbuild(
    project_dir: &Path,
    project_file: &str,
    config: Configuration,
    clean: bool,
) -> Result<BuildOutcome> {
    let mut builder = ProcessBuilder::new("vcbuild.exe");
    if clean {
        builder = builder.arg("/rebuild");
    }
    let output = builder
        .arg(project_file)
        .arg(config.as_str())
        .cwd(project_dir)
        .exec_combined()?;

    Ok(BuildOutcome {
        succeeded: vs_output_succeeded(&output),
        output,
    })
}
