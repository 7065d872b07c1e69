//! # Validate Command Implementation
//!
//! Checks the shape of a remote URL without touching the network. Exits
//! non-zero when the URL is rejected.

use anyhow::{bail, Result};
use clap::Args;

use scm_mirror::output::{status, Marker, OutputConfig};
use scm_mirror::validation::validate_url;

/// Validate a remote URL
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Remote repository URL or absolute local path
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<()> {
    let errors = validate_url(Some(&args.url));
    if errors.is_empty() {
        println!("{}", status(out, Marker::Ok, &format!("{} is valid", args.url)));
        return Ok(());
    }

    for error in &errors {
        println!(
            "{}",
            status(out, Marker::Fail, &format!("{}: {}", error.key, error.message))
        );
    }
    bail!("validation failed for {}", args.url)
}
