//! # scm-mirror CLI
//!
//! Binary entry point for `scm-mirror`. It parses arguments with `clap`, sets
//! up logging and hands off to the command implementations, which are thin
//! wrappers over the `scm_mirror` library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
