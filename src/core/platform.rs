//! Target platform and build configuration model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform a build script is generated for.
///
/// Generation always targets the host platform; the enum exists so the
/// resolver, filter, and synthesizers can be exercised for any platform
/// in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Linux,
    Windows,
}

impl Platform {
    /// Detect the platform of the machine running the generator.
    pub fn host() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// The preprocessor define identifying this platform to the compiled code.
    pub fn define(&self) -> &'static str {
        match self {
            Platform::Mac => "SW_PLATFORM_MAC",
            Platform::Linux => "SW_PLATFORM_LINUX",
            Platform::Windows => "SW_PLATFORM_WIN",
        }
    }

    /// Whether generation for this platform emits a Makefile.
    ///
    /// Windows gets a Visual C++ project document instead.
    pub fn uses_make(&self) -> bool {
        !matches!(self, Platform::Windows)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build configuration selected for a generation/build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Configuration {
    #[default]
    Debug,
    Release,
}

impl Configuration {
    /// Normalize the loose configuration names accepted on the command line.
    ///
    /// `Development`/`dev`/`Debug` select Debug; `Deployment`/`dep`/`Release`
    /// select Release. Anything else defaults to Debug.
    pub fn from_cli_name(name: &str) -> Configuration {
        match name {
            "Deployment" | "Release" | "dep" | "release" => Configuration::Release,
            _ => Configuration::Debug,
        }
    }

    /// The Make target name for this configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
