//! Build and error log files.
//!
//! A suite run keeps two append-only logs under its log root: `build.log`
//! with the full output of successful builds, `error.log` with the output of
//! failed ones. The final summary is printed to the terminal regardless;
//! failures never live only in a log file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::fs::ensure_dir;

/// Open log files for one suite run.
#[derive(Debug)]
pub struct BuildLogs {
    build: File,
    error: File,
    root: PathBuf,
}

impl BuildLogs {
    /// Create `build.log` and `error.log` under the log root, truncating any
    /// previous run's files.
    pub fn create(log_root: &Path, title: &str) -> Result<BuildLogs> {
        ensure_dir(log_root)?;

        let build_path = log_root.join("build.log");
        let mut build = File::create(&build_path)
            .with_context(|| format!("failed to create {}", build_path.display()))?;
        writeln!(build, "{} BUILD LOG\n", title.to_uppercase())?;

        let error_path = log_root.join("error.log");
        let mut error = File::create(&error_path)
            .with_context(|| format!("failed to create {}", error_path.display()))?;
        writeln!(error, "{} BUILD ERROR LOG", title.to_uppercase())?;

        Ok(BuildLogs {
            build,
            error,
            root: log_root.to_path_buf(),
        })
    }

    /// Append a chunk of build output.
    pub fn log_build(&mut self, text: &str) {
        let _ = writeln!(self.build, "{}\n", text);
        let _ = self.build.flush();
    }

    /// Append a chunk of error output. Empty chunks are skipped so the error
    /// log stays readable.
    pub fn log_error(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = writeln!(self.error, "{}\n", text);
        let _ = self.error.flush();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
