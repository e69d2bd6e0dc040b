//! Building a whole module suite.
//!
//! A suite is one `library/` directory plus any number of module directories
//! under `extensions/`. The runner walks them in that fixed order, generates
//! each module's build script, runs the native tool, classifies the result,
//! and folds everything into a [`SuiteReport`]. A failing module never stops
//! the batch; it lands in the report's failure list, which the summary
//! prints in full.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::probe::{HostProbe, RealProbe};
use crate::builder::{generate, GenerateRequest, Generated};
use crate::core::manifest::CompilerPref;
use crate::core::platform::{Configuration, Platform};
use crate::ops::run::{run_make, run_vcbuild, BuildOutcome};
use crate::util::fs::find_module_dirs;
use crate::util::logs::BuildLogs;
use crate::util::shell::{Shell, Status};

/// Options for a suite run.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Suite root containing `library/` and `extensions/`.
    pub root: PathBuf,
    pub configuration: Configuration,
    /// Clean before building each module.
    pub clean: bool,
    /// Compiler override applied to every module.
    pub forced_compiler: Option<CompilerPref>,
    /// Distribution path passed through to generation.
    pub distro_path: Option<String>,
    /// Log directory; defaults to `<root>/logs`.
    pub log_root: Option<PathBuf>,
}

/// Per-run result counters and the failure list.
///
/// Counters are explicit return values folded by the caller; nothing in the
/// runner mutates process-wide state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    /// Modules whose build script was run.
    pub attempted: usize,
    /// Modules that built successfully.
    pub built: usize,
    /// Names of every failed module, in build order.
    pub failures: Vec<String>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, name: &str, succeeded: bool) {
        self.attempted += 1;
        if succeeded {
            self.built += 1;
        } else {
            self.failures.push(name.to_string());
        }
    }
}

/// Build the whole suite: the library first, then every extension.
pub fn build_suite(opts: &SuiteOptions, shell: &Shell) -> Result<SuiteReport> {
    let probe = RealProbe;
    build_suite_with_probe(opts, shell, &probe)
}

/// [`build_suite`] with an injected host probe, for tests.
pub fn build_suite_with_probe(
    opts: &SuiteOptions,
    shell: &Shell,
    probe: &dyn HostProbe,
) -> Result<SuiteReport> {
    let log_root = opts
        .log_root
        .clone()
        .unwrap_or_else(|| opts.root.join("logs"));
    let suite_name = opts
        .root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("suite");
    let mut logs = BuildLogs::create(&log_root, suite_name)?;

    let mut report = SuiteReport::default();

    let library_dir = opts.root.join("library");
    if library_dir.is_dir() {
        build_module(&library_dir, "..", opts, probe, shell, &mut logs, &mut report);
    }

    let extensions_root = opts.root.join("extensions");
    if extensions_root.is_dir() {
        for dir in find_module_dirs(&extensions_root) {
            build_module(&dir, "../..", opts, probe, shell, &mut logs, &mut report);
        }
    }

    print_summary(shell, &report);
    Ok(report)
}

fn build_module(
    dir: &Path,
    module_root: &str,
    opts: &SuiteOptions,
    probe: &dyn HostProbe,
    shell: &Shell,
    logs: &mut BuildLogs,
    report: &mut SuiteReport,
) {
    let name = match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => return,
    };
    let platform = Platform::host();

    let request = GenerateRequest {
        project_dir: dir,
        project_name: &name,
        platform,
        configuration: opts.configuration,
        forced_compiler: opts.forced_compiler,
        module_root,
        distro_path: opts.distro_path.as_deref(),
    };

    let generated = match generate(&request, probe) {
        Ok(generated) => generated,
        Err(err) => {
            // Malformed manifest or write failure: fatal for this module
            // only; the batch keeps going.
            logs.log_error(&format!("{}: {:#}", name, err));
            shell.error(format!("{}: {:#}", name, err));
            report.record(&name, false);
            return;
        }
    };

    let script = match &generated {
        Generated::Makefile(path) | Generated::VcProject(path) => Some(path.clone()),
        // No manifest: fall back to a pre-existing script if the module has
        // one, otherwise there is nothing to build.
        Generated::Skipped => find_existing_script(dir, platform),
    };
    let Some(script) = script else {
        shell.status(Status::Skipped, format!("{} (no manifest, no script)", name));
        return;
    };

    if generated.did_generate() {
        shell.status(Status::Generated, script.display());
    }
    shell.status(Status::Building, &name);

    let outcome = if platform.uses_make() {
        run_make(dir, opts.configuration, opts.clean)
    } else {
        let project_file = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        run_vcbuild(dir, &project_file, opts.configuration, opts.clean)
    };

    match outcome {
        Ok(BuildOutcome { succeeded, output }) => {
            if succeeded {
                logs.log_build(&output);
            } else {
                logs.log_error(&output);
            }
            shell.build_result(&name, succeeded);
            report.record(&name, succeeded);
        }
        Err(err) => {
            logs.log_error(&format!("{}: {:#}", name, err));
            shell.build_result(&name, false);
            report.record(&name, false);
        }
    }
}

/// A pre-existing build script for modules without a manifest.
fn find_existing_script(dir: &Path, platform: Platform) -> Option<PathBuf> {
    if platform.uses_make() {
        let makefile = dir.join("Makefile");
        return makefile.is_file().then_some(makefile);
    }
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "vcproj"))
}

fn print_summary(shell: &Shell, report: &SuiteReport) {
    if report.is_success() {
        shell.status(
            Status::Built,
            format!("{}/{} projects", report.built, report.attempted),
        );
        return;
    }
    shell.error(format!(
        "{} of {} projects failed:",
        report.failures.len(),
        report.attempted
    ));
    for name in &report.failures {
        shell.error(format!("  {}", name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::shell::{ColorChoice, Verbosity};
    use tempfile::TempDir;

    fn quiet_shell() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    fn options(root: &Path) -> SuiteOptions {
        SuiteOptions {
            root: root.to_path_buf(),
            configuration: Configuration::Debug,
            clean: false,
            forced_compiler: None,
            distro_path: None,
            log_root: None,
        }
    }

    #[test]
    fn test_report_folding() {
        let mut report = SuiteReport::default();
        report.record("library", true);
        report.record("Gain", false);
        report.record("Delay", true);
        report.record("Chorus", false);

        assert_eq!(report.attempted, 4);
        assert_eq!(report.built, 2);
        assert_eq!(report.failures, vec!["Gain", "Chorus"]);
        assert!(!report.is_success());
    }

    #[test]
    fn test_empty_suite_reports_nothing() {
        let tmp = TempDir::new().unwrap();
        let report = build_suite(&options(tmp.path()), &quiet_shell()).unwrap();
        assert_eq!(report, SuiteReport::default());
        // The log files exist even for an empty run.
        assert!(tmp.path().join("logs/build.log").is_file());
        assert!(tmp.path().join("logs/error.log").is_file());
    }

    #[test]
    fn test_module_without_manifest_or_script_is_skipped() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("extensions/Empty")).unwrap();

        let report = build_suite(&options(tmp.path()), &quiet_shell()).unwrap();
        assert_eq!(report.attempted, 0);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_malformed_manifest_fails_module_and_continues() {
        let tmp = TempDir::new().unwrap();
        let bad = tmp.path().join("extensions/Bad");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join("Bad.toml"), "sources = \"oops\"\n").unwrap();

        let report = build_suite(&options(tmp.path()), &quiet_shell()).unwrap();
        assert_eq!(report.failures, vec!["Bad"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_fallback_script_is_run_and_classified() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("extensions/Stub");
        std::fs::create_dir_all(&module).unwrap();
        // No manifest: the runner falls back to this pre-existing script.
        std::fs::write(
            module.join("Makefile"),
            "Debug:\n\t@echo built fine\nRelease:\n\t@echo built fine\n",
        )
        .unwrap();

        let report = build_suite(&options(tmp.path()), &quiet_shell()).unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.built, 1);
        assert!(report.is_success());
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_module_lands_in_summary() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("extensions/Broken");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(
            module.join("Makefile"),
            "Debug:\n\t@echo 'Gain.cpp:1:1: error: boom'\n",
        )
        .unwrap();

        let report = build_suite(&options(tmp.path()), &quiet_shell()).unwrap();
        assert_eq!(report.failures, vec!["Broken"]);

        let error_log =
            std::fs::read_to_string(tmp.path().join("logs/error.log")).unwrap();
        assert!(error_log.contains("error: boom"));
    }
}
