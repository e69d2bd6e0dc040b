//! Project manifest parsing and schema.
//!
//! Each module directory carries a `<name>.toml` manifest describing what to
//! compile and link. The manifest is declarative: ordered source/include/
//! library lists (with optional platform and configuration tags, see
//! [`crate::core::entry`]), preprocessor defines, Apple frameworks, a
//! compiler preference, an architecture pin, and post-build shell commands.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::entry::TaggedEntry;
use crate::core::target::ProjectKind;

/// Compiler preference as written in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerPref {
    Icc,
    Gcc46,
    Gcc47,
    Gcc,
    Clang,
}

impl CompilerPref {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerPref::Icc => "icc",
            CompilerPref::Gcc46 => "gcc46",
            CompilerPref::Gcc47 => "gcc47",
            CompilerPref::Gcc => "gcc",
            CompilerPref::Clang => "clang",
        }
    }
}

impl std::str::FromStr for CompilerPref {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "icc" => Ok(CompilerPref::Icc),
            "gcc46" => Ok(CompilerPref::Gcc46),
            "gcc47" => Ok(CompilerPref::Gcc47),
            "gcc" => Ok(CompilerPref::Gcc),
            "clang" => Ok(CompilerPref::Clang),
            other => Err(format!(
                "unknown compiler '{}'; expected icc, gcc46, gcc47, gcc, or clang",
                other
            )),
        }
    }
}

/// Architecture pin. `i386` restricts Apple builds to 32-bit only; without a
/// pin both architectures are built and merged into a universal binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ArchPin {
    #[serde(rename = "i386")]
    I386,
}

/// Error loading a manifest. Missing files are not an error (the caller
/// skips the module or falls back to a pre-existing script); anything else
/// is fatal for that module only.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw manifest as deserialized from TOML. Every section is optional; a
/// missing list is simply empty.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    sources: Vec<TaggedEntry>,

    #[serde(default)]
    includes: Vec<TaggedEntry>,

    #[serde(default)]
    libraries: Vec<TaggedEntry>,

    #[serde(default)]
    defines: Vec<String>,

    /// Apple frameworks; ignored on other platforms.
    #[serde(default)]
    frameworks: Vec<String>,

    #[serde(default)]
    compiler: Option<CompilerPref>,

    #[serde(default)]
    arch: Option<ArchPin>,

    /// Prefix header passed to the compiler with `-include`.
    #[serde(default)]
    prefix: Option<String>,

    /// Shell commands appended verbatim to the install step.
    #[serde(default)]
    postbuilds: Vec<String>,

    /// Build-output directory override (implementation bundles land here).
    #[serde(default)]
    builddir: Option<String>,

    /// Project kind override; defaults from the module directory name.
    #[serde(default)]
    kind: Option<ProjectKind>,
}

/// The parsed project manifest, with tags decoded and defaults applied.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Project name (the module directory name).
    pub name: String,

    /// What this module builds into.
    pub kind: ProjectKind,

    pub sources: Vec<TaggedEntry>,
    pub includes: Vec<TaggedEntry>,
    pub libraries: Vec<TaggedEntry>,
    pub defines: Vec<String>,
    pub frameworks: Vec<String>,

    pub compiler: Option<CompilerPref>,
    pub arch: Option<ArchPin>,
    pub prefix: Option<String>,
    pub postbuilds: Vec<String>,

    /// Build-output directory, default `../Builds`.
    pub builddir: String,

    /// The directory containing this manifest.
    pub manifest_dir: PathBuf,
}

impl Manifest {
    /// Load the manifest for a module directory.
    ///
    /// Looks for `<dir>/<name>.toml`. Returns `Ok(None)` when the file does
    /// not exist.
    pub fn load(project_dir: &Path, name: &str) -> Result<Option<Manifest>, ManifestError> {
        let path = project_dir.join(format!("{}.toml", name));
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content, name, project_dir).map(Some)
    }

    /// Parse manifest content for a named module.
    pub fn parse(content: &str, name: &str, project_dir: &Path) -> Result<Manifest, ManifestError> {
        let raw: RawManifest =
            toml::from_str(content).map_err(|source| ManifestError::Malformed {
                path: project_dir.join(format!("{}.toml", name)),
                source,
            })?;

        let dir_name = project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);
        let kind = raw.kind.unwrap_or_else(|| ProjectKind::from_dir_name(dir_name));

        Ok(Manifest {
            name: name.to_string(),
            kind,
            sources: raw.sources,
            includes: raw.includes,
            libraries: raw.libraries,
            defines: raw.defines,
            frameworks: raw.frameworks,
            compiler: raw.compiler,
            arch: raw.arch,
            prefix: raw.prefix,
            postbuilds: raw.postbuilds,
            builddir: raw.builddir.unwrap_or_else(|| "../Builds".to_string()),
            manifest_dir: project_dir.to_path_buf(),
        })
    }

    /// Whether the architecture pin restricts Apple output to 32-bit only.
    pub fn is_32bit_only(&self) -> bool {
        self.arch == Some(ArchPin::I386)
    }

    /// Project name with the comment marker escaped, safe to embed in
    /// generated Make text.
    pub fn escaped_name(&self) -> String {
        escape_comment_marker(&self.name)
    }
}

/// Escape the comment-marker character in a project name.
///
/// Both the manifest format and Make treat `#` as a comment delimiter, so a
/// name containing it must be escaped wherever it lands in generated text.
pub fn escape_comment_marker(name: &str) -> String {
    name.replace('#', "\\#")
}

/// Revert [`escape_comment_marker`]. Applied to emitted document values that
/// must carry the literal name (Visual C++ project attributes).
pub fn unescape_comment_marker(name: &str) -> String {
    name.replace("\\#", "#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::{ConfigTag, PlatformTag};
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic_manifest() {
        let content = r#"
sources = ["Spatializer.cpp", "mac SpatializerMac.mm"]
includes = ["../../library/includes"]
libraries = ["FOUNDATION", "DSP"]
"#;
        let manifest = Manifest::parse(content, "Spatializer", Path::new("ext/Spatializer")).unwrap();
        assert_eq!(manifest.name, "Spatializer");
        assert_eq!(manifest.kind, ProjectKind::Extension);
        assert_eq!(manifest.sources.len(), 2);
        assert_eq!(manifest.sources[1].platform, Some(PlatformTag::Mac));
        assert_eq!(manifest.builddir, "../Builds");
        assert!(manifest.postbuilds.is_empty());
    }

    #[test]
    fn test_missing_optional_sections_are_empty() {
        let manifest =
            Manifest::parse("sources = [\"A.cpp\"]", "A", Path::new("ext/A")).unwrap();
        assert!(manifest.libraries.is_empty());
        assert!(manifest.defines.is_empty());
        assert!(manifest.frameworks.is_empty());
        assert!(manifest.compiler.is_none());
        assert!(manifest.arch.is_none());
    }

    #[test]
    fn test_kind_from_directory_and_override() {
        let lib = Manifest::parse("sources = []", "Core", Path::new("suite/library")).unwrap();
        assert_eq!(lib.kind, ProjectKind::Library);

        let imp = Manifest::parse(
            "sources = []\nkind = \"implementation\"",
            "HostShim",
            Path::new("suite/extensions/HostShim"),
        )
        .unwrap();
        assert_eq!(imp.kind, ProjectKind::Implementation);
    }

    #[test]
    fn test_compiler_and_arch() {
        let content = r#"
sources = ["A.cpp"]
compiler = "gcc47"
arch = "i386"
prefix = "SlipwayPrefix.h"
"#;
        let manifest = Manifest::parse(content, "A", Path::new("ext/A")).unwrap();
        assert_eq!(manifest.compiler, Some(CompilerPref::Gcc47));
        assert!(manifest.is_32bit_only());
        assert_eq!(manifest.prefix.as_deref(), Some("SlipwayPrefix.h"));
    }

    #[test]
    fn test_config_tagged_library() {
        let content = r#"
sources = ["A.cpp"]
libraries = ["win DEBUG foo_d.lib", "win RELEASE foo.lib"]
"#;
        let manifest = Manifest::parse(content, "A", Path::new("ext/A")).unwrap();
        assert_eq!(manifest.libraries[0].config, Some(ConfigTag::Debug));
        assert_eq!(manifest.libraries[1].config, Some(ConfigTag::Release));
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let result = Manifest::parse("sources = \"not-a-list\"", "A", Path::new("ext/A"));
        assert!(matches!(result, Err(ManifestError::Malformed { .. })));

        let result = Manifest::parse("compiler = \"msvc\"", "A", Path::new("ext/A"));
        assert!(matches!(result, Err(ManifestError::Malformed { .. })));
    }

    #[test]
    fn test_load_missing_manifest_is_none() {
        let tmp = TempDir::new().unwrap();
        let loaded = Manifest::load(tmp.path(), "Ghost").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("Gain.toml"),
            "sources = [\"Gain.cpp\"]\nlibraries = [\"DSP\"]\n",
        )
        .unwrap();

        let manifest = Manifest::load(tmp.path(), "Gain").unwrap().unwrap();
        assert_eq!(manifest.name, "Gain");
        assert_eq!(manifest.manifest_dir, tmp.path());
    }

    #[test]
    fn test_comment_marker_round_trip() {
        let name = "filter#2";
        let escaped = escape_comment_marker(name);
        assert_eq!(escaped, "filter\\#2");
        assert_eq!(unescape_comment_marker(&escaped), name);

        // Names without the marker pass through untouched both ways.
        assert_eq!(escape_comment_marker("plain"), "plain");
        assert_eq!(unescape_comment_marker("plain"), "plain");
    }
}
