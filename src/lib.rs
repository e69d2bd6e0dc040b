//! Slipway - manifest-driven build-script generator for a native module suite
//!
//! This crate provides the core library functionality for Slipway: parsing
//! per-module build manifests, resolving the active compiler toolchain,
//! filtering tagged source/include/library lists, and synthesizing the
//! platform build script (a Makefile on Unix-like hosts, a Visual C++
//! project on Windows) that the suite runner then drives.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::core::entry::TaggedEntry;
pub use crate::core::manifest::Manifest;
pub use crate::core::platform::{Configuration, Platform};
pub use crate::core::target::{BuildTarget, ProjectKind};

pub use builder::{generate, GenerateRequest, Generated};
pub use ops::{build_suite, SuiteOptions, SuiteReport};
pub use util::Shell;
