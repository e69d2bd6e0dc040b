//! High-level operations: running generated scripts, building the suite.

pub mod run;
pub mod suite;

pub use suite::{build_suite, SuiteOptions, SuiteReport};
