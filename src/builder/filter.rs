//! Tag filtering and symbolic name resolution.
//!
//! Raw manifest lists become the final compile/link unit lists here: entries
//! scoped to another platform are dropped, matching tags are stripped (the
//! tag is metadata, never part of the value), untagged entries pass through
//! unchanged, and order is always preserved. Library entries additionally
//! filter by build configuration.
//!
//! Symbolic library names let manifests reference suite modules without
//! knowing the physical install layout; resolution is a pure function of
//! (name, platform) and unknown names are treated as literal library
//! references, never errors, since manifests may link arbitrary third-party
//! libraries.

use crate::core::entry::TaggedEntry;
use crate::core::platform::{Configuration, Platform};
use crate::core::target::backslashed;

/// Filter a manifest list for a platform, stripping matched tags.
pub fn filter_for_platform(entries: &[TaggedEntry], platform: Platform) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.platform.map_or(true, |tag| tag.matches(platform)))
        .map(|e| e.value.clone())
        .collect()
}

/// Filter a library list for a platform and one build configuration.
///
/// The Make path needs a single list (the configuration being built); the
/// Windows path calls this twice to get independent Debug and Release lists.
pub fn filter_libraries(
    entries: &[TaggedEntry],
    platform: Platform,
    config: Configuration,
) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.platform.map_or(true, |tag| tag.matches(platform)))
        .filter(|e| e.config.map_or(true, |tag| tag.matches(config)))
        .map(|e| e.value.clone())
        .collect()
}

/// Object file names for one architecture of an Apple build, plus the
/// source extensions present (one pattern rule is emitted per extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSet {
    pub objects: Vec<String>,
    pub extensions: Vec<String>,
}

/// Map filtered sources to object names for an architecture.
///
/// `arch` is the object-name infix (`i386`, `x64`), or `None` on platforms
/// that build a single architecture. C++ sources take the plain `.o` scheme;
/// any other extension (Objective-C++ `.mm` in practice) keeps its extension
/// in the object name so its pattern rule stays distinct.
pub fn object_set(sources: &[String], arch: Option<&str>) -> ObjectSet {
    let mut objects = Vec::new();
    let mut extensions: Vec<String> = Vec::new();

    for source in sources {
        let (stem, ext) = match source.rsplit_once('.') {
            Some((stem, ext)) => (stem, ext),
            None => (source.as_str(), ""),
        };
        let object = match (arch, ext) {
            (Some(arch), "cpp") => format!("{}.{}.o", stem, arch),
            (Some(arch), _) => format!("{}.{}.{}.o", stem, arch, ext),
            (None, "cpp") => format!("{}.o", stem),
            (None, _) => format!("{}.{}.o", stem, ext),
        };
        objects.push(object);
        if !ext.is_empty() && !extensions.iter().any(|e| e == ext) {
            extensions.push(ext.to_string());
        }
    }

    ObjectSet {
        objects,
        extensions,
    }
}

/// The object suffix a pattern rule produces for an (arch, extension) pair,
/// mirroring [`object_set`] naming.
pub fn object_rule_suffix(arch: Option<&str>, ext: &str) -> String {
    match (arch, ext) {
        (Some(arch), "cpp") => format!(".{}.o", arch),
        (Some(arch), _) => format!(".{}.{}.o", arch, ext),
        (None, "cpp") => ".o".to_string(),
        (None, _) => format!(".{}.o", ext),
    }
}

/// The suite modules a manifest may name symbolically.
const SUITE_LIBRARIES: [(&str, &str); 5] = [
    ("FOUNDATION", "Foundation"),
    ("MODULAR", "Modular"),
    ("DSP", "DSP"),
    ("GRAPH", "Graph"),
    ("AUDIOGRAPH", "AudioGraph"),
];

/// Host-SDK import libraries (Windows links these directly; on Unix the SDK
/// is consumed through frameworks/includes, so the aliases stay literal).
const SDK_LIBRARIES: [(&str, &str, &str); 3] = [
    ("HOST-API", "HostAPI.lib", "api-includes"),
    ("HOST-AUDIO", "HostAudio.lib", "audio-includes"),
    ("HOST-GFX", "HostGraphics.lib", "gfx-includes"),
];

/// Where a suite module's Windows import library lives, relative to the
/// suite root. Windows builds reference sibling per-module outputs directly
/// rather than an installed shared-library tree.
fn suite_module_dir(suite_name: &str) -> String {
    if suite_name == "Modular" {
        "Modules\\Modular\\library".to_string()
    } else {
        format!("Core\\{}\\library", suite_name)
    }
}

/// A library reference resolved for the Make synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeLibrary {
    /// Text for the `LIBS` accumulation variable.
    pub reference: String,
    /// Search path for `LIB_INCLUDES` (`-L` form), where one applies.
    pub search_dir: Option<String>,
}

/// Resolve one library entry for a Unix Make build.
pub fn resolve_library_make(value: &str, platform: Platform, module_root: &str) -> MakeLibrary {
    if let Some((_, suite_name)) = SUITE_LIBRARIES.iter().find(|(alias, _)| *alias == value) {
        return match platform {
            Platform::Mac => MakeLibrary {
                reference: format!(
                    "{}/support/slipway/lib/Slipway{}.dylib",
                    module_root, suite_name
                ),
                search_dir: None,
            },
            _ => MakeLibrary {
                reference: format!("-lSlipway{}", suite_name),
                search_dir: Some(format!("-L{}/support/slipway/lib", module_root)),
            },
        };
    }

    match platform {
        // Mac links by direct path; the literal entry already is one.
        Platform::Mac => MakeLibrary {
            reference: value.to_string(),
            search_dir: None,
        },
        _ => {
            let (name, dir) = derive_linker_ref(value);
            MakeLibrary {
                reference: format!("-l{}", name),
                search_dir: Some(format!("-L{}", dir)),
            }
        }
    }
}

/// Derive a `-l` name and search directory from a literal library filename,
/// e.g. `deps/libfoo.so` → (`foo`, `deps`).
fn derive_linker_ref(value: &str) -> (String, String) {
    let (dir, file) = match value.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file),
        None => (".".to_string(), value),
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let name = stem.strip_prefix("lib").unwrap_or(stem);
    (name.to_string(), dir)
}

/// A library reference resolved for the Visual C++ project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinLibrary {
    /// Entry for the linker's AdditionalDependencies list.
    pub lib: String,
    /// Entry for the AdditionalLibraryDirectories list (unquoted).
    pub search_dir: String,
}

/// Resolve one library entry for a Windows build.
///
/// `module_root_win` is the backslashed module-root path.
pub fn resolve_library_windows(value: &str, module_root_win: &str) -> WinLibrary {
    if let Some((_, suite_name)) = SUITE_LIBRARIES.iter().find(|(alias, _)| *alias == value) {
        return WinLibrary {
            lib: format!("Slipway{}.lib", suite_name),
            search_dir: format!(
                "$(ProjectDir){}\\..\\..\\{}\\$(ConfigurationName)",
                module_root_win,
                suite_module_dir(suite_name)
            ),
        };
    }

    if let Some((_, lib, sdk_dir)) = SDK_LIBRARIES.iter().find(|(alias, _, _)| *alias == value) {
        return WinLibrary {
            lib: (*lib).to_string(),
            search_dir: format!(
                "$(ProjectDir){}\\..\\..\\Core\\Shared\\host\\sdk\\{}",
                module_root_win, sdk_dir
            ),
        };
    }

    let (dir, file) = match value.rsplit_once('/') {
        Some((dir, file)) => (dir.to_string(), file.to_string()),
        None => (String::new(), value.to_string()),
    };
    WinLibrary {
        lib: file,
        search_dir: backslashed(&dir),
    }
}

/// Expand the one symbolic include alias.
///
/// `HOST-INCLUDES` names the external SDK's split header tree; it expands to
/// its three concrete subtrees, joined so the accumulated `INCLUDES` variable
/// carries one `-I` per subtree. Everything else passes through unchanged.
pub fn expand_include(value: &str, module_root: &str) -> String {
    if value == "HOST-INCLUDES" {
        let sdk = format!("{}/../../Core/Shared/host/sdk", module_root);
        format!(
            "{sdk}/api-includes -I{sdk}/audio-includes -I{sdk}/gfx-includes",
            sdk = sdk
        )
    } else {
        value.to_string()
    }
}

/// The three SDK include subtrees for the Windows include-path list.
pub fn expand_include_windows(value: &str, module_root_win: &str) -> Vec<String> {
    if value == "HOST-INCLUDES" {
        let sdk = format!("{}\\..\\..\\Core\\Shared\\host\\sdk", module_root_win);
        vec![
            format!("{}\\api-includes", sdk),
            format!("{}\\audio-includes", sdk),
            format!("{}\\gfx-includes", sdk),
        ]
    } else {
        vec![backslashed(value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(raw: &[&str]) -> Vec<TaggedEntry> {
        raw.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_untagged_filtering_is_identity() {
        let list = entries(&["A.cpp", "B.cpp", "C.cpp"]);
        for platform in [Platform::Mac, Platform::Linux, Platform::Windows] {
            assert_eq!(
                filter_for_platform(&list, platform),
                vec!["A.cpp", "B.cpp", "C.cpp"]
            );
        }
    }

    #[test]
    fn test_platform_filtering_drops_and_strips() {
        let list = entries(&["A.cpp", "mac B.mm", "win C.cpp", "linux D.cpp"]);

        // Foreign-platform entries are dropped; matching tags are stripped.
        assert_eq!(filter_for_platform(&list, Platform::Mac), vec!["A.cpp", "B.mm"]);
        assert_eq!(
            filter_for_platform(&list, Platform::Windows),
            vec!["A.cpp", "C.cpp"]
        );
        assert_eq!(
            filter_for_platform(&list, Platform::Linux),
            vec!["A.cpp", "D.cpp"]
        );
    }

    #[test]
    fn test_library_config_filtering() {
        let list = entries(&["FOUNDATION", "win DEBUG foo_d.lib", "win RELEASE foo.lib"]);

        let debug = filter_libraries(&list, Platform::Windows, Configuration::Debug);
        assert_eq!(debug, vec!["FOUNDATION", "foo_d.lib"]);

        let release = filter_libraries(&list, Platform::Windows, Configuration::Release);
        assert_eq!(release, vec!["FOUNDATION", "foo.lib"]);

        // A configuration tag composes with a platform tag: the entry is
        // gone entirely on other platforms.
        let mac = filter_libraries(&list, Platform::Mac, Configuration::Debug);
        assert_eq!(mac, vec!["FOUNDATION"]);
    }

    #[test]
    fn test_object_naming_split_arch() {
        let sources = vec!["Gain.cpp".to_string(), "GainView.mm".to_string()];

        let set32 = object_set(&sources, Some("i386"));
        assert_eq!(set32.objects, vec!["Gain.i386.o", "GainView.i386.mm.o"]);
        assert_eq!(set32.extensions, vec!["cpp", "mm"]);

        let set64 = object_set(&sources, Some("x64"));
        assert_eq!(set64.objects, vec!["Gain.x64.o", "GainView.x64.mm.o"]);
    }

    #[test]
    fn test_object_naming_single_arch() {
        let sources = vec!["Gain.cpp".to_string(), "Extra.cpp".to_string()];
        let set = object_set(&sources, None);
        assert_eq!(set.objects, vec!["Gain.o", "Extra.o"]);
        assert_eq!(set.extensions, vec!["cpp"]);
    }

    #[test]
    fn test_object_rule_suffix_matches_naming() {
        assert_eq!(object_rule_suffix(Some("i386"), "cpp"), ".i386.o");
        assert_eq!(object_rule_suffix(Some("x64"), "mm"), ".x64.mm.o");
        assert_eq!(object_rule_suffix(None, "cpp"), ".o");
    }

    #[test]
    fn test_suite_library_on_mac() {
        let lib = resolve_library_make("FOUNDATION", Platform::Mac, "../..");
        assert_eq!(
            lib.reference,
            "../../support/slipway/lib/SlipwayFoundation.dylib"
        );
        assert_eq!(lib.search_dir, None);
    }

    #[test]
    fn test_suite_library_on_linux() {
        let lib = resolve_library_make("AUDIOGRAPH", Platform::Linux, "../..");
        assert_eq!(lib.reference, "-lSlipwayAudioGraph");
        assert_eq!(
            lib.search_dir.as_deref(),
            Some("-L../../support/slipway/lib")
        );
    }

    #[test]
    fn test_literal_library_derives_linker_ref() {
        let lib = resolve_library_make("libfoo.so", Platform::Linux, "../..");
        assert_eq!(lib.reference, "-lfoo");
        assert_eq!(lib.search_dir.as_deref(), Some("-L."));

        let lib = resolve_library_make("deps/vendored/libbar.a", Platform::Linux, "../..");
        assert_eq!(lib.reference, "-lbar");
        assert_eq!(lib.search_dir.as_deref(), Some("-Ldeps/vendored"));
    }

    #[test]
    fn test_resolution_is_pure_and_total() {
        for name in ["FOUNDATION", "MODULAR", "DSP", "GRAPH", "AUDIOGRAPH", "libx.so"] {
            let a = resolve_library_make(name, Platform::Linux, "../..");
            let b = resolve_library_make(name, Platform::Linux, "../..");
            assert_eq!(a, b);
        }
        // Unknown names pass through unchanged on mac.
        let lib = resolve_library_make("SomeVendorKit", Platform::Mac, "../..");
        assert_eq!(lib.reference, "SomeVendorKit");
    }

    #[test]
    fn test_windows_suite_library() {
        let lib = resolve_library_windows("DSP", "..\\..");
        assert_eq!(lib.lib, "SlipwayDSP.lib");
        assert_eq!(
            lib.search_dir,
            "$(ProjectDir)..\\..\\..\\..\\Core\\DSP\\library\\$(ConfigurationName)"
        );

        let lib = resolve_library_windows("MODULAR", "..\\..");
        assert_eq!(lib.lib, "SlipwayModular.lib");
        assert!(lib.search_dir.contains("Modules\\Modular\\library"));
    }

    #[test]
    fn test_windows_sdk_library() {
        let lib = resolve_library_windows("HOST-AUDIO", "..\\..");
        assert_eq!(lib.lib, "HostAudio.lib");
        assert!(lib.search_dir.ends_with("Core\\Shared\\host\\sdk\\audio-includes"));
    }

    #[test]
    fn test_windows_literal_library() {
        let lib = resolve_library_windows("deps/vendored/bar.lib", "..\\..");
        assert_eq!(lib.lib, "bar.lib");
        assert_eq!(lib.search_dir, "deps\\vendored");
    }

    #[test]
    fn test_include_alias_expansion() {
        let expanded = expand_include("HOST-INCLUDES", "../..");
        assert_eq!(
            expanded,
            "../../../../Core/Shared/host/sdk/api-includes \
             -I../../../../Core/Shared/host/sdk/audio-includes \
             -I../../../../Core/Shared/host/sdk/gfx-includes"
        );
        assert_eq!(expand_include("includes", "../.."), "includes");
    }

    #[test]
    fn test_include_alias_expansion_windows() {
        let expanded = expand_include_windows("HOST-INCLUDES", "..\\..");
        assert_eq!(expanded.len(), 3);
        assert!(expanded[0].ends_with("api-includes"));
        assert_eq!(expand_include_windows("a/b", "..\\.."), vec!["a\\b"]);
    }
}
