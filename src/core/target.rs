//! Project kinds and the (kind × platform) build-target mapping.

use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;

/// What a module builds into.
///
/// The kind decides the output suffix and where `install` copies the result.
/// It normally follows from the module directory name (`library` builds the
/// shared library, everything else is an extension); a manifest may override
/// it, which is how implementation projects declare themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Library,
    Extension,
    Implementation,
}

impl ProjectKind {
    /// The default kind for a module directory name.
    pub fn from_dir_name(name: &str) -> ProjectKind {
        if name == "library" {
            ProjectKind::Library
        } else {
            ProjectKind::Extension
        }
    }
}

/// Everything the synthesizers need to know about where a build lands.
///
/// Fully determined by (kind, platform); the mapping is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Output file suffix, including the leading dot (empty for bundle-style
    /// outputs whose binary carries no suffix).
    pub suffix: String,
    /// Where `install` copies the merged output.
    pub install_dest: String,
    /// Directory touched after install so bundle caches notice the update.
    /// Equals `install_dest` except for implementation bundles.
    pub touch_dest: String,
    /// Temporary directory for objects and pre-merge binaries.
    pub build_temp: String,
    /// Whether install needs root on this platform.
    pub needs_sudo: bool,
}

impl BuildTarget {
    /// Resolve the build target for a project kind on a platform.
    ///
    /// `module_root` is the module's path back to the suite root (typically
    /// `../..`); `builddir` is the manifest build-output directory. Both only
    /// matter for implementation bundles, whose output lands inside the
    /// build tree rather than an installed location.
    pub fn resolve(
        kind: ProjectKind,
        platform: Platform,
        module_root: &str,
        builddir: &str,
    ) -> BuildTarget {
        let suffix = match (kind, platform) {
            (ProjectKind::Library, Platform::Mac) => ".dylib",
            (ProjectKind::Library, Platform::Linux) => ".so",
            (ProjectKind::Library, Platform::Windows) => ".dll",
            (ProjectKind::Extension, Platform::Mac) => ".swdylib",
            (ProjectKind::Extension, Platform::Linux) => ".swso",
            (ProjectKind::Extension, Platform::Windows) => ".swdll",
            // The bundle wrapper carries the identity; the binary inside has
            // no suffix.
            (ProjectKind::Implementation, Platform::Mac) => "",
            (ProjectKind::Implementation, Platform::Linux) => "",
            (ProjectKind::Implementation, Platform::Windows) => ".xplug",
        }
        .to_string();

        let (install_dest, touch_dest) = match (kind, platform) {
            (ProjectKind::Library, Platform::Mac) => dest("/usr/local/slipway/lib"),
            (ProjectKind::Library, Platform::Linux) => dest("/usr/local/lib/slipway/lib"),
            (ProjectKind::Extension, Platform::Mac) => dest("/usr/local/slipway/extensions"),
            (ProjectKind::Extension, Platform::Linux) => {
                dest("/usr/local/lib/slipway/extensions")
            }
            (ProjectKind::Implementation, Platform::Mac) => {
                let bundle = format!("{}/../{}/Plugins/$(NAME).bundle", module_root, builddir);
                (format!("{}/Contents/MacOS/", bundle), format!("{}/", bundle))
            }
            (ProjectKind::Implementation, Platform::Linux) => {
                dest("/usr/local/slipway/implementations")
            }
            // Windows installs through the project's post-build hook into the
            // shared tree; the Make-side mapping still has to be total.
            (ProjectKind::Library | ProjectKind::Extension, Platform::Windows) => {
                dest("$(CommonProgramFiles)\\Slipway\\Extensions")
            }
            (ProjectKind::Implementation, Platform::Windows) => {
                let d = format!("{}\\..\\Builds\\Plugins", backslashed(module_root));
                (d.clone(), d)
            }
        };

        BuildTarget {
            suffix,
            install_dest,
            touch_dest,
            build_temp: "build".to_string(),
            needs_sudo: platform == Platform::Linux,
        }
    }
}

fn dest(path: &str) -> (String, String) {
    (path.to_string(), path.to_string())
}

/// Rewrite a forward-slash path for embedding in Windows project text.
pub fn backslashed(path: &str) -> String {
    path.replace('/', "\\")
}
