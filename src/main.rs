//! bundlec - Command-line registry precompiler

use std::process::ExitCode;

use bundlec::cli;

fn main() -> ExitCode {
    cli::run()
}
