//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use slipway::core::manifest::CompilerPref;
use slipway::util::shell::ColorChoice;

/// Slipway - manifest-driven build-script generator for a native module suite
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate scripts and build the whole suite (library, then extensions)
    Build(BuildArgs),

    /// Generate the build script for a single module directory
    Generate(GenerateArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build configuration (Development/Debug or Deployment/Release)
    #[arg(default_value = "Development")]
    pub configuration: String,

    /// Clean each module before building
    #[arg(long)]
    pub clean: bool,

    /// Compiler override applied to every module (icc, gcc46, gcc47, gcc, clang)
    #[arg(long)]
    pub compiler: Option<CompilerPref>,

    /// Distribution path embedded in installed outputs
    #[arg(long)]
    pub distro_path: Option<String>,

    /// Suite root containing library/ and extensions/ (defaults to current dir)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Log directory (defaults to <root>/logs)
    #[arg(long)]
    pub log_root: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Module directory containing the manifest
    pub project_dir: PathBuf,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Build configuration the script's libraries are filtered for
    #[arg(long, default_value = "Development")]
    pub configuration: String,

    /// Compiler override (icc, gcc46, gcc47, gcc, clang)
    #[arg(long)]
    pub compiler: Option<CompilerPref>,

    /// The module's relative path back to the suite root
    #[arg(long, default_value = "../..")]
    pub module_root: String,

    /// Distribution path embedded in installed outputs
    #[arg(long)]
    pub distro_path: Option<String>,
}
