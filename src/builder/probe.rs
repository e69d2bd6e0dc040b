//! Host capability probing.
//!
//! The only impure step in generation is asking the host which compiler
//! binaries exist (and whether the host is an ARM board). That question goes
//! through the [`HostProbe`] trait so toolchain resolution can be tested
//! against simulated hosts without touching a real filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Answers the two questions generation asks about the host.
pub trait HostProbe {
    /// Whether a compiler is present. `command` is either an absolute path
    /// (checked on disk) or a bare command name (looked up on PATH).
    fn compiler_exists(&self, command: &str) -> bool;

    /// Whether the host is an ARM board (SIMD flags are dropped and the ARM
    /// platform define added).
    fn is_arm(&self) -> bool;
}

/// Probe backed by the real host.
#[derive(Debug, Default)]
pub struct RealProbe;

impl HostProbe for RealProbe {
    fn compiler_exists(&self, command: &str) -> bool {
        let path = Path::new(command);
        if path.is_absolute() {
            path.is_file()
        } else {
            which::which(command).is_ok()
        }
    }

    fn is_arm(&self) -> bool {
        cfg!(any(target_arch = "arm", target_arch = "aarch64"))
    }
}

/// Probe with a fixed answer set, for tests.
#[derive(Debug, Default)]
pub struct FixedProbe {
    present: HashSet<PathBuf>,
    arm: bool,
}

impl FixedProbe {
    /// A host with no compilers at all.
    pub fn empty() -> FixedProbe {
        FixedProbe::default()
    }

    /// A host on which exactly the given compiler commands exist.
    pub fn with_compilers<I, S>(commands: I) -> FixedProbe
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FixedProbe {
            present: commands
                .into_iter()
                .map(|c| PathBuf::from(c.as_ref()))
                .collect(),
            arm: false,
        }
    }

    pub fn arm(mut self) -> FixedProbe {
        self.arm = true;
        self
    }
}

impl HostProbe for FixedProbe {
    fn compiler_exists(&self, command: &str) -> bool {
        self.present.contains(Path::new(command))
    }

    fn is_arm(&self) -> bool {
        self.arm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_probe() {
        let probe = FixedProbe::with_compilers(["/usr/bin/clang++", "g++"]);
        assert!(probe.compiler_exists("/usr/bin/clang++"));
        assert!(probe.compiler_exists("g++"));
        assert!(!probe.compiler_exists("/usr/bin/icc"));
        assert!(!probe.is_arm());
    }

    #[test]
    fn test_fixed_probe_arm() {
        let probe = FixedProbe::empty().arm();
        assert!(probe.is_arm());
    }
}
