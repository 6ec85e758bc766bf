//! Command-line interface implementation
//!
//! Parses arguments, merges them over `bundlec.toml`, and hands the result
//! to [`compile`] for a single compilation run.

mod compile;

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::build::ConsoleLogger;
use crate::config::parse_name_list;

pub use compile::run_compile;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;

/// Comma-separated extension names to enable
pub const EXTENSIONS_ENV: &str = "BUNDLEC_EXTENSIONS";
/// Legacy switch for a separate modules run
pub const MODULES_ENV: &str = "BUNDLEC_MODULES";

/// bundlec - Precompile component, style and theme bundles into a registry
#[derive(Parser, Debug)]
#[command(name = "bundlec")]
#[command(about = "Precompile component, style and theme bundles into a serialized registry")]
#[command(version)]
pub struct Cli {
    /// Comma-separated list of source directories, in priority order
    pub sources: Option<String>,

    /// Directory to write the registry into
    pub output: Option<PathBuf>,

    /// Namespaces to skip
    pub excluded: Vec<String>,

    /// Path to bundlec.toml (default: search upward from the working directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat unreadable source files as fatal
    #[arg(long)]
    pub strict: bool,

    /// Write the registry even when compilation reports errors
    #[arg(long)]
    pub serialize_on_failure: bool,

    /// Enumerate source directories sequentially
    #[arg(long)]
    pub no_parallel: bool,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Extension names from [`EXTENSIONS_ENV`].
pub fn env_extensions() -> Vec<String> {
    env::var(EXTENSIONS_ENV).map(|v| parse_name_list(&v)).unwrap_or_default()
}

/// Whether [`MODULES_ENV`] asks for a separate modules run.
pub fn modules_requested() -> bool {
    env::var(MODULES_ENV).map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let logger = Arc::new(ConsoleLogger::new().with_verbose(cli.verbose));
    ExitCode::from(run_compile(&cli, logger))
}
