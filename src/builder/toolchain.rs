//! Toolchain selection.
//!
//! Exactly one toolchain is active per generation call. Selection priority:
//!
//! 1. Caller-supplied override (always wins)
//! 2. Manifest `compiler` preference
//! 3. Host default probe order: on Apple hosts Intel > Clang > GCC 4.7,
//!    falling back to Clang with a warning when nothing usable is found;
//!    on other Unix hosts the generic system compiler, no probing.
//!
//! The probe itself lives behind [`HostProbe`](super::probe::HostProbe) so
//! this whole chain is testable against simulated hosts.

use crate::builder::probe::HostProbe;
use crate::core::manifest::CompilerPref;
use crate::core::platform::{Configuration, Platform};

/// The compiler families a generated script can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainKind {
    IntelCompiler,
    Gcc46,
    Gcc47,
    Clang,
    GenericGcc,
}

impl ToolchainKind {
    /// The binary whose presence makes this toolchain usable.
    fn probe_command(&self) -> &'static str {
        match self {
            ToolchainKind::IntelCompiler => "/usr/bin/icc",
            ToolchainKind::Gcc46 => "/opt/local/bin/g++-mp-4.6",
            ToolchainKind::Gcc47 => "/opt/local/bin/g++-mp-4.7",
            ToolchainKind::Clang => "/usr/bin/clang++",
            ToolchainKind::GenericGcc => "g++",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::IntelCompiler => "icc",
            ToolchainKind::Gcc46 => "gcc-4.6",
            ToolchainKind::Gcc47 => "gcc-4.7",
            ToolchainKind::Clang => "clang",
            ToolchainKind::GenericGcc => "gcc",
        }
    }
}

/// A resolved toolchain: invocation commands plus the option profile the
/// Make synthesizer writes into the script.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub kind: ToolchainKind,

    /// 32-bit compile/link driver invocation.
    pub cc_32: String,

    /// 64-bit driver invocation; `None` when the toolchain builds a single
    /// architecture (generic Unix).
    pub cc_64: Option<String>,

    /// Link-mode and SIMD/codegen options for the `OPTIONS` variable.
    pub options: String,

    /// Language-standard flag. The Intel compiler predates the final
    /// standard name and takes the draft token.
    pub std_flag: &'static str,

    /// Runtime-library selection flag, where the toolchain needs one.
    pub runtime_flag: Option<&'static str>,

    /// Whether to link libgcc statically (MacPorts GCC builds).
    pub static_libgcc: bool,

    /// Whether this toolchain can produce both architectures of a
    /// universal binary.
    pub universal: bool,

    /// Platform warning set.
    pub warnings: &'static str,
}

impl Toolchain {
    fn new(kind: ToolchainKind, platform: Platform, arm: bool) -> Toolchain {
        let (cc_32, cc_64) = match kind {
            ToolchainKind::IntelCompiler => (
                "icc -arch i386".to_string(),
                Some("icc -arch x86_64".to_string()),
            ),
            ToolchainKind::GenericGcc => ("g++".to_string(), None),
            _ => {
                let driver = kind.probe_command();
                (
                    format!("{} -arch i386", driver),
                    Some(format!("{} -arch x86_64", driver)),
                )
            }
        };

        let options = match (platform, kind) {
            (Platform::Mac, ToolchainKind::IntelCompiler) => {
                // ftz flushes denormals; fp-model fast=2 trades float
                // accuracy for speed.
                "-dynamiclib -ip -msse3 -ftz -fno-alias -fp-model fast=2"
            }
            (Platform::Mac, _) => "-shared -msse3 -mfpmath=sse -gdwarf-2",
            _ if arm => "-shared -g",
            _ => "-shared -msse3 -mfpmath=sse -g",
        }
        .to_string();

        Toolchain {
            kind,
            cc_32,
            cc_64,
            options,
            std_flag: match kind {
                ToolchainKind::IntelCompiler => "-std=c++0x",
                _ => "-std=c++11",
            },
            runtime_flag: match kind {
                ToolchainKind::Clang => Some("-stdlib=libc++"),
                _ => None,
            },
            static_libgcc: kind == ToolchainKind::Gcc47,
            universal: kind != ToolchainKind::GenericGcc,
            warnings: match platform {
                Platform::Mac => "-Wall -Wno-unknown-pragmas -Wno-trigraphs",
                _ => "-Wall -Wno-unknown-pragmas -Wno-conversion",
            },
        }
    }
}

/// Optimization flags per configuration: none for Debug, maximum for Release.
pub fn optimization(config: Configuration) -> &'static str {
    match config {
        Configuration::Debug => "-O0",
        Configuration::Release => "-O3",
    }
}

/// Resolve the active toolchain for a generation call.
///
/// `forced` is the caller override; `preferred` the manifest preference.
pub fn resolve(
    platform: Platform,
    preferred: Option<CompilerPref>,
    forced: Option<CompilerPref>,
    probe: &dyn HostProbe,
) -> Toolchain {
    let arm = probe.is_arm();

    // Non-Apple Unix always uses the one system compiler; preferences and
    // probe order do not apply.
    if platform != Platform::Mac {
        return Toolchain::new(ToolchainKind::GenericGcc, platform, arm);
    }

    let requested = forced.or(preferred);
    let candidates: &[ToolchainKind] = match requested {
        Some(CompilerPref::Icc) => &[ToolchainKind::IntelCompiler],
        Some(CompilerPref::Clang) => &[ToolchainKind::Clang],
        Some(CompilerPref::Gcc47) => &[ToolchainKind::Gcc47],
        Some(CompilerPref::Gcc46) => &[ToolchainKind::Gcc46],
        // Plain gcc has no Apple probe target; the fallback below applies.
        Some(CompilerPref::Gcc) => &[],
        None => &[
            ToolchainKind::IntelCompiler,
            ToolchainKind::Clang,
            ToolchainKind::Gcc47,
        ],
    };

    for &kind in candidates {
        if probe.compiler_exists(kind.probe_command()) {
            tracing::debug!("selected toolchain: {}", kind.as_str());
            return Toolchain::new(kind, platform, arm);
        }
    }

    match requested {
        Some(pref) => tracing::warn!(
            "requested compiler '{}' not found on this host; falling back to clang",
            pref.as_str()
        ),
        None => tracing::warn!("no supported compiler found on this host; falling back to clang"),
    }
    Toolchain::new(ToolchainKind::Clang, platform, arm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::probe::FixedProbe;

    const ALL_MAC: [&str; 3] = [
        "/usr/bin/icc",
        "/usr/bin/clang++",
        "/opt/local/bin/g++-mp-4.7",
    ];

    #[test]
    fn test_probe_order_prefers_intel() {
        let probe = FixedProbe::with_compilers(ALL_MAC);
        let tc = resolve(Platform::Mac, None, None, &probe);
        assert_eq!(tc.kind, ToolchainKind::IntelCompiler);
        assert_eq!(tc.cc_32, "icc -arch i386");
        assert_eq!(tc.cc_64.as_deref(), Some("icc -arch x86_64"));
        assert_eq!(tc.std_flag, "-std=c++0x");
        assert!(tc.universal);
    }

    #[test]
    fn test_probe_order_clang_before_gcc47() {
        let probe = FixedProbe::with_compilers(["/usr/bin/clang++", "/opt/local/bin/g++-mp-4.7"]);
        let tc = resolve(Platform::Mac, None, None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Clang);
        assert_eq!(tc.runtime_flag, Some("-stdlib=libc++"));
    }

    #[test]
    fn test_probe_reaches_gcc47() {
        let probe = FixedProbe::with_compilers(["/opt/local/bin/g++-mp-4.7"]);
        let tc = resolve(Platform::Mac, None, None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Gcc47);
        assert!(tc.static_libgcc);
        assert_eq!(tc.std_flag, "-std=c++11");
    }

    #[test]
    fn test_manifest_preference_restricts_probe() {
        let probe = FixedProbe::with_compilers(ALL_MAC);
        let tc = resolve(Platform::Mac, Some(CompilerPref::Gcc47), None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Gcc47);
    }

    #[test]
    fn test_override_beats_manifest_preference() {
        let probe = FixedProbe::with_compilers(ALL_MAC);
        let tc = resolve(
            Platform::Mac,
            Some(CompilerPref::Gcc47),
            Some(CompilerPref::Clang),
            &probe,
        );
        assert_eq!(tc.kind, ToolchainKind::Clang);
    }

    #[test]
    fn test_missing_toolchain_falls_back_to_clang() {
        // Preference for a compiler that is not installed must not abort a
        // batch run; it degrades to clang.
        let probe = FixedProbe::with_compilers(["/usr/bin/clang++"]);
        let tc = resolve(Platform::Mac, Some(CompilerPref::Icc), None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Clang);

        let tc = resolve(Platform::Mac, None, None, &FixedProbe::empty());
        assert_eq!(tc.kind, ToolchainKind::Clang);
    }

    #[test]
    fn test_gcc46_only_by_request() {
        let probe = FixedProbe::with_compilers([
            "/opt/local/bin/g++-mp-4.6",
            "/opt/local/bin/g++-mp-4.7",
        ]);
        // Default order never probes 4.6.
        let tc = resolve(Platform::Mac, None, None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Gcc47);
        // Explicit request does.
        let tc = resolve(Platform::Mac, Some(CompilerPref::Gcc46), None, &probe);
        assert_eq!(tc.kind, ToolchainKind::Gcc46);
    }

    #[test]
    fn test_generic_unix_ignores_probe_and_preference() {
        let tc = resolve(
            Platform::Linux,
            Some(CompilerPref::Icc),
            None,
            &FixedProbe::empty(),
        );
        assert_eq!(tc.kind, ToolchainKind::GenericGcc);
        assert_eq!(tc.cc_32, "g++");
        assert!(tc.cc_64.is_none());
        assert!(!tc.universal);
        assert_eq!(tc.options, "-shared -msse3 -mfpmath=sse -g");
    }

    #[test]
    fn test_arm_host_drops_simd() {
        let tc = resolve(Platform::Linux, None, None, &FixedProbe::empty().arm());
        assert_eq!(tc.options, "-shared -g");
    }

    #[test]
    fn test_optimization_per_configuration() {
        assert_eq!(optimization(Configuration::Debug), "-O0");
        assert_eq!(optimization(Configuration::Release), "-O3");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let probe = FixedProbe::with_compilers(ALL_MAC);
        let a = resolve(Platform::Mac, None, None, &probe);
        let b = resolve(Platform::Mac, None, None, &probe);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.cc_32, b.cc_32);
        assert_eq!(a.options, b.options);
    }
}
