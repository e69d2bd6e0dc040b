//! Tagged manifest entries.
//!
//! Source, include, and library lists in the manifest carry optional leading
//! tags that scope an entry to one platform (`mac `, `win `, `linux `) and,
//! for libraries, to one build configuration (`DEBUG `, `RELEASE `). Tags are
//! decoded once here, at load time; the rest of the generator only ever sees
//! the structured form.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::core::platform::{Configuration, Platform};

/// Platform scope tag on a manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformTag {
    Mac,
    Win,
    Linux,
}

impl PlatformTag {
    fn from_token(token: &str) -> Option<PlatformTag> {
        match token {
            "mac" => Some(PlatformTag::Mac),
            "win" => Some(PlatformTag::Win),
            "linux" => Some(PlatformTag::Linux),
            _ => None,
        }
    }

    /// Whether this tag selects the given target platform.
    pub fn matches(&self, platform: Platform) -> bool {
        matches!(
            (self, platform),
            (PlatformTag::Mac, Platform::Mac)
                | (PlatformTag::Win, Platform::Windows)
                | (PlatformTag::Linux, Platform::Linux)
        )
    }
}

/// Build-configuration scope tag on a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTag {
    Debug,
    Release,
}

impl ConfigTag {
    fn from_token(token: &str) -> Option<ConfigTag> {
        match token {
            "DEBUG" => Some(ConfigTag::Debug),
            "RELEASE" => Some(ConfigTag::Release),
            _ => None,
        }
    }

    /// Whether this tag selects the given configuration.
    pub fn matches(&self, config: Configuration) -> bool {
        matches!(
            (self, config),
            (ConfigTag::Debug, Configuration::Debug)
                | (ConfigTag::Release, Configuration::Release)
        )
    }
}

/// A manifest list entry with its filter metadata decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEntry {
    /// Platform the entry is scoped to, if any.
    pub platform: Option<PlatformTag>,
    /// Configuration the entry is scoped to, if any (libraries only).
    pub config: Option<ConfigTag>,
    /// The entry value with all tags stripped.
    pub value: String,
}

impl TaggedEntry {
    /// An entry with no filter tags.
    pub fn untagged(value: impl Into<String>) -> TaggedEntry {
        TaggedEntry {
            platform: None,
            config: None,
            value: value.into(),
        }
    }
}

/// Error decoding a tagged entry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TagError {
    #[error("entry is empty after tags")]
    EmptyValue,
}

impl FromStr for TaggedEntry {
    type Err = TagError;

    /// Decode leading tags: an optional platform token, then an optional
    /// configuration token, then the value (which may itself contain spaces).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_start();
        let mut platform = None;
        let mut config = None;

        if let Some((token, tail)) = rest.split_once(' ') {
            if let Some(tag) = PlatformTag::from_token(token) {
                platform = Some(tag);
                rest = tail.trim_start();
            }
        }
        if let Some((token, tail)) = rest.split_once(' ') {
            if let Some(tag) = ConfigTag::from_token(token) {
                config = Some(tag);
                rest = tail.trim_start();
            }
        }

        let value = rest.trim_end();
        if value.is_empty() {
            return Err(TagError::EmptyValue);
        }

        Ok(TaggedEntry {
            platform,
            config,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for TaggedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for TaggedEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
